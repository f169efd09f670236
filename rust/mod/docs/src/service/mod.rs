pub mod document;
pub mod schema;

use std::sync::Arc;

use thiserror::Error;

use assura_core::{Clock, Notifier, ReviewerDirectory, ServiceError};
use assura_store::{BlobStore, JsonTable, SQLStore, StoreError};

use crate::config::DocumentConfig;

/// Document service error type.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported content type '{0}': only PDF, JPG, JPEG and PNG files are allowed")]
    UnsupportedType(String),

    #[error("file too large: {size} bytes (maximum {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("file is empty")]
    EmptyFile,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<StoreError> for DocumentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Codec(m) => DocumentError::Internal(m),
            other => DocumentError::Storage(other.to_string()),
        }
    }
}

impl From<DocumentError> for ServiceError {
    fn from(e: DocumentError) -> Self {
        let msg = e.to_string();
        match e {
            DocumentError::UnsupportedType(_)
            | DocumentError::TooLarge { .. }
            | DocumentError::EmptyFile => ServiceError::Validation(msg),
            DocumentError::NotFound(_) => ServiceError::NotFound(msg),
            DocumentError::Storage(_) => ServiceError::Storage(msg),
            DocumentError::Internal(_) => ServiceError::Internal(msg),
        }
    }
}

/// Uploaded documents for users and claims.
pub struct DocumentService {
    pub(crate) documents: JsonTable,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) reviewers: Arc<dyn ReviewerDirectory>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: DocumentConfig,
}

impl DocumentService {
    /// Create a new DocumentService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        reviewers: Arc<dyn ReviewerDirectory>,
        clock: Arc<dyn Clock>,
        config: DocumentConfig,
    ) -> Result<Arc<Self>, DocumentError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self {
            documents: JsonTable::new(sql, schema::DOCUMENTS),
            blobs,
            notifier,
            reviewers,
            clock,
            config,
        }))
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }
}
