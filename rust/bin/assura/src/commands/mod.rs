pub mod bootstrap;
pub mod password;
pub mod session;

use std::sync::Arc;

use assura_auth::{AuthConfig, AuthService};
use assura_core::{Clock, LogNotifier, Notifier, ReviewerDirectory, ServerConfig, SystemClock};
use assura_docs::{DocumentConfig, DocumentService};
use assura_policy::PolicyLedger;
use assura_store::{BlobStore, FileStore, KVStore, RedbStore, SQLStore, SqliteStore};

/// Every service, wired to the stores under the configured data dir.
pub struct Services {
    pub auth: Arc<AuthService>,
    pub ledger: Arc<PolicyLedger>,
    pub docs: Arc<DocumentService>,
}

impl Services {
    pub fn open(config: &ServerConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(config.data_dir())?;

        // Initialize embedded stores (shared by all modules).
        let sql: Arc<dyn SQLStore> = Arc::new(
            SqliteStore::open(&config.sqlite_path())
                .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
        );
        let kv: Arc<dyn KVStore> = Arc::new(
            RedbStore::open(&config.kv_path())
                .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
        );
        let blobs: Arc<dyn BlobStore> = Arc::new(
            FileStore::open(&config.blob_dir())
                .map_err(|e| anyhow::anyhow!("failed to open blob store: {}", e))?,
        );

        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let auth = AuthService::new(
            Arc::clone(&sql),
            kv,
            Arc::clone(&notifier),
            Arc::clone(&clock),
            AuthConfig::from_server(config)?,
        )?;
        let ledger = PolicyLedger::new(Arc::clone(&sql), Arc::clone(&clock))?;
        let reviewers: Arc<dyn ReviewerDirectory> = auth.clone();
        let docs = DocumentService::new(
            sql,
            blobs,
            notifier,
            reviewers,
            clock,
            DocumentConfig::default(),
        )?;

        Ok(Self { auth, ledger, docs })
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use assura_core::ServerConfig;

    /// A valid configuration rooted in `dir`.
    pub fn config_in(dir: &std::path::Path) -> ServerConfig {
        let toml = format!(
            r#"
[storage]
data_dir = "{}"

[jwt]
secret = "test-secret"

[root]
username = "root"
email = "root@assura.test"
password_hash = "{}"
"#,
            dir.display(),
            assura_auth::hash_password("root-pw").unwrap()
        );
        ServerConfig::parse(&toml).unwrap()
    }
}
