use assura_store::SQLStore;

use crate::service::DocumentError;

pub const DOCUMENTS: &str = "documents";

/// Initialize the SQLite schema for document metadata.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), DocumentError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            owner_kind TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(owner_kind, owner_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])?;
    }

    Ok(())
}
