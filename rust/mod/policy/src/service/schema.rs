use assura_store::SQLStore;

use crate::service::LedgerError;

pub const PLANS: &str = "policy_plans";
pub const POLICIES: &str = "user_policies";

/// Initialize the SQLite schema for plans and policies.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), LedgerError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS policy_plans (
            id TEXT PRIMARY KEY,
            admin_id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_policy_plans_admin ON policy_plans(admin_id)",

        // status is the transition guard column
        "CREATE TABLE IF NOT EXISTS user_policies (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            plan_id TEXT NOT NULL REFERENCES policy_plans(id),
            status TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_user_policies_user ON user_policies(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_policies_plan ON user_policies(plan_id)",
        "CREATE INDEX IF NOT EXISTS idx_user_policies_status ON user_policies(status)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])?;
    }

    Ok(())
}
