pub mod account;
pub mod contact;
pub mod login;
pub mod password;
pub mod registration;
pub mod schema;
pub mod token;

use std::sync::Arc;

use thiserror::Error;

use assura_core::{Clock, Notifier, ServiceError};
use assura_store::{JsonTable, KVStore, SQLStore, StoreError};

use crate::identity::FieldMismatch;

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no contact record matches the given email or PAN")]
    NoMatchingRecord,

    #[error("{}", join_mismatches(.0))]
    FieldMismatch(Vec<FieldMismatch>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("OTP is missing or empty")]
    OtpMissingOrEmpty,

    #[error("invalid OTP")]
    OtpMismatch,

    #[error("OTP has expired")]
    OtpExpired,

    #[error("notification failed: {0}")]
    NotificationFailed(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

fn join_mismatches(list: &[FieldMismatch]) -> String {
    list.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Constraint(m) => AuthError::Conflict(m),
            StoreError::Codec(m) => AuthError::Internal(m),
            other => AuthError::Storage(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        let msg = e.to_string();
        match e {
            AuthError::NoMatchingRecord | AuthError::AccountNotFound(_) => {
                ServiceError::NotFound(msg)
            }
            AuthError::FieldMismatch(_) | AuthError::Validation(_) => ServiceError::Validation(msg),
            AuthError::InvalidCredentials
            | AuthError::OtpMissingOrEmpty
            | AuthError::OtpMismatch
            | AuthError::OtpExpired
            | AuthError::Unauthorized(_) => ServiceError::Unauthorized(msg),
            AuthError::NotificationFailed(_) => ServiceError::Unavailable(msg),
            AuthError::Conflict(_) => ServiceError::Conflict(msg),
            AuthError::Storage(_) => ServiceError::Storage(msg),
            AuthError::Internal(_) => ServiceError::Internal(msg),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
    /// One-time code lifetime in seconds (default: 60).
    pub otp_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "assura-dev-secret-change-me".to_string(),
            access_token_ttl: 86400, // 24h
            otp_ttl: 60,
        }
    }
}

impl AuthConfig {
    pub fn from_server(config: &assura_core::ServerConfig) -> Result<Self, AuthError> {
        let access_token_ttl = i64::try_from(config.jwt.expire_secs)
            .map_err(|_| AuthError::Validation("jwt.expire_secs out of range".into()))?;
        let otp_ttl = i64::try_from(config.otp.ttl_secs)
            .map_err(|_| AuthError::Validation("otp.ttl_secs out of range".into()))?;
        Ok(Self {
            jwt_secret: config.jwt.secret.clone(),
            access_token_ttl,
            otp_ttl,
        })
    }
}

/// The Auth service. Holds storage backends, the mail transport, the clock
/// and configuration.
pub struct AuthService {
    pub(crate) accounts: JsonTable,
    pub(crate) contacts: JsonTable,
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        kv: Arc<dyn KVStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            accounts: JsonTable::new(sql.clone(), schema::ACCOUNTS),
            contacts: JsonTable::new(sql, schema::CONTACTS),
            kv,
            notifier,
            clock,
            config,
        }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityField;

    #[test]
    fn errors_map_to_service_codes() {
        let e: ServiceError = AuthError::OtpExpired.into();
        assert_eq!(e.error_code(), "UNAUTHENTICATED");

        let e: ServiceError = AuthError::NotificationFailed("smtp down".into()).into();
        assert_eq!(e.error_code(), "UNAVAILABLE");

        let e: ServiceError = AuthError::FieldMismatch(vec![FieldMismatch {
            field: IdentityField::Username,
            contact: "Ravi".into(),
            candidate: "ravi".into(),
        }])
        .into();
        assert_eq!(e.error_code(), "VALIDATION_FAILED");
        assert!(e.to_string().contains("contact='Ravi' vs admin='ravi'"));
    }

    #[test]
    fn lifetimes_past_i64_are_rejected() {
        let mut config = assura_core::ServerConfig::parse(
            r#"
[storage]
data_dir = "/tmp/assura"

[jwt]
secret = "s"

[root]
username = "root"
email = "root@x.com"
password_hash = "x"
"#,
        )
        .unwrap();
        let auth = AuthConfig::from_server(&config).unwrap();
        assert_eq!(auth.access_token_ttl, 86400);
        assert_eq!(auth.otp_ttl, 60);

        config.jwt.expire_secs = u64::MAX;
        assert!(matches!(
            AuthConfig::from_server(&config),
            Err(AuthError::Validation(_))
        ));
    }
}
