use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A UNIQUE / NOT NULL / CHECK constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("sql error: {0}")]
    Sql(String),

    #[error("kv error: {0}")]
    Kv(String),

    #[error("blob I/O error: {0}")]
    Blob(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A stored record could not be (de)serialized.
    #[error("codec error: {0}")]
    Codec(String),
}

impl StoreError {
    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}
