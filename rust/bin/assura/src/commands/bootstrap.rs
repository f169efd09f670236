//! Bootstrap — first-start setup.
//!
//! 1. Open (and create) the SQLite, redb and blob stores under `data_dir`.
//! 2. Initialize every module's schema.
//! 3. Ensure the `[root]` privileged account exists.

use tracing::info;

use assura_auth::model::{AdminAccount, NewPrivilegedAccount};
use assura_core::ServerConfig;

use super::Services;

pub fn run(config: &ServerConfig) -> anyhow::Result<()> {
    let services = Services::open(config)?;
    let root = ensure_root(&services, config)?;

    let plans = services.ledger.list_plans()?.len();
    let documents = services.docs.list_all()?.len();
    info!(plans, documents, "stores ready at {}", config.data_dir().display());
    println!("root account: {} <{}>", root.username, root.email);
    Ok(())
}

/// Create the root account from `[root]` unless its email is already taken.
pub fn ensure_root(services: &Services, config: &ServerConfig) -> anyhow::Result<AdminAccount> {
    let input = NewPrivilegedAccount {
        username: config.root.username.clone(),
        email: config.root.email.clone(),
        pan_number: config.root.pan_number.clone(),
        mobile_number: config.root.mobile_number.clone(),
    };
    let (account, created) = services
        .auth
        .ensure_privileged_account(input, &config.root.password_hash)?;
    if created {
        info!(account = %account.id, "Created root account");
    } else {
        info!(account = %account.id, "Root account already exists");
    }
    Ok(account)
}
