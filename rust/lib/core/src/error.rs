use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Callers match on these,
// never on the human-readable message string.

/// Stable error code constants.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const FAILED_PRECONDITION: &str = "FAILED_PRECONDITION";
    pub const UNAVAILABLE: &str = "UNAVAILABLE";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified error type shared by every module.
///
/// Module errors (`AuthError`, `LedgerError`, `DocumentError`) convert into
/// this type so a binding layer only has to map one enum. Each variant maps
/// to a stable code (see [`error_code`]).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key, or the resource is still referenced.
    #[error("{0}")]
    Conflict(String),

    /// Input data is invalid.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials, one-time code or token.
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is identified but not allowed to do this.
    #[error("{0}")]
    PermissionDenied(String),

    /// The resource is not in a state that allows the operation.
    #[error("{0}")]
    FailedPrecondition(String),

    /// An external collaborator (mail, storage device) did not respond.
    #[error("{0}")]
    Unavailable(String),

    /// Storage backend failure.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            ServiceError::FailedPrecondition(_) => error_code::FAILED_PRECONDITION,
            ServiceError::Unavailable(_) => error_code::UNAVAILABLE,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// Whether the failure was caused by the caller's input or the target's
    /// state, as opposed to an infrastructure fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            ServiceError::Unavailable(_) | ServiceError::Storage(_) | ServiceError::Internal(_)
        )
    }
}
