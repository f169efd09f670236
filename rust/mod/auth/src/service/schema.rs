use assura_store::SQLStore;

use crate::service::AuthError;

pub const ACCOUNTS: &str = "admin_accounts";
pub const CONTACTS: &str = "contact_submissions";

/// Initialize the SQLite schema for all auth resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), AuthError> {
    let statements = [
        // Admin accounts: email is the login key
        "CREATE TABLE IF NOT EXISTS admin_accounts (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_admin_accounts_role ON admin_accounts(role)",

        // Contact submissions: looked up by email, then PAN
        "CREATE TABLE IF NOT EXISTS contact_submissions (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            pan_number TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_contact_submissions_email ON contact_submissions(email)",
        "CREATE INDEX IF NOT EXISTS idx_contact_submissions_pan ON contact_submissions(pan_number)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])?;
    }

    Ok(())
}
