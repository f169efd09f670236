pub mod ledger;
pub mod plan;
pub mod schema;

use std::sync::Arc;

use thiserror::Error;

use assura_core::{Clock, ServiceError};
use assura_store::{JsonTable, SQLStore, StoreError};

use crate::model::PolicyStatus;

/// Policy ledger error type.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("cannot move policy from {from} to {to}")]
    InvalidTransition { from: PolicyStatus, to: PolicyStatus },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Constraint(m) => LedgerError::Conflict(m),
            StoreError::Codec(m) => LedgerError::Internal(m),
            other => LedgerError::Storage(other.to_string()),
        }
    }
}

impl From<LedgerError> for ServiceError {
    fn from(e: LedgerError) -> Self {
        let msg = e.to_string();
        match e {
            LedgerError::PolicyNotFound(_) | LedgerError::PlanNotFound(_) => {
                ServiceError::NotFound(msg)
            }
            LedgerError::InvalidTransition { .. } => ServiceError::FailedPrecondition(msg),
            LedgerError::Conflict(_) => ServiceError::Conflict(msg),
            LedgerError::Validation(_) => ServiceError::Validation(msg),
            LedgerError::Storage(_) => ServiceError::Storage(msg),
            LedgerError::Internal(_) => ServiceError::Internal(msg),
        }
    }
}

/// Plans and user policies. Status changes go through [`PolicyLedger::activate`]
/// and [`PolicyLedger::reject`].
pub struct PolicyLedger {
    pub(crate) plans: JsonTable,
    pub(crate) policies: JsonTable,
    pub(crate) clock: Arc<dyn Clock>,
}

impl PolicyLedger {
    /// Create a new PolicyLedger, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>, clock: Arc<dyn Clock>) -> Result<Arc<Self>, LedgerError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            plans: JsonTable::new(sql.clone(), schema::PLANS),
            policies: JsonTable::new(sql, schema::POLICIES),
            clock,
        }))
    }
}
