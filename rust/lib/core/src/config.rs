use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory holding named server contexts (`-c prod` → `/etc/assura/prod.toml`).
pub const CONTEXT_DIR: &str = "/etc/assura";

/// Longest accepted session token lifetime (one year).
pub const MAX_JWT_EXPIRE_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest accepted one-time code lifetime (one day).
pub const MAX_OTP_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("cannot parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration, loaded from a TOML file.
///
/// ```toml
/// [storage]
/// data_dir = "/var/lib/assura"
///
/// [jwt]
/// secret = "..."
/// expire_secs = 86400
///
/// [otp]
/// ttl_secs = 60
///
/// [root]
/// username = "Super Admin"
/// email = "root@assura.example"
/// password_hash = "$argon2id$..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    pub root: RootConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the SQLite file, the redb file and uploaded blobs.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Session token lifetime in seconds.
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// One-time code validity window in seconds.
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
        }
    }
}

/// The privileged account created on bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub pan_number: String,
    #[serde(default)]
    pub mobile_number: String,
    /// argon2id PHC string.
    pub password_hash: String,
}

fn default_expire_secs() -> u64 {
    86400
}

fn default_otp_ttl() -> u64 {
    60
}

impl ServerConfig {
    /// Resolve a context name or a path. Anything containing `/` or `.` is
    /// treated as a path; a bare name maps into [`CONTEXT_DIR`].
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONTEXT_DIR).join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            reason: e.to_string(),
        })
    }

    /// Refuse to start with an unusable configuration.
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.data_dir is empty".into()));
        }
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Invalid("jwt.secret is empty".into()));
        }
        if self.jwt.expire_secs == 0 || self.jwt.expire_secs > MAX_JWT_EXPIRE_SECS {
            return Err(ConfigError::Invalid(format!(
                "jwt.expire_secs must be in 1..={}",
                MAX_JWT_EXPIRE_SECS
            )));
        }
        if self.otp.ttl_secs == 0 || self.otp.ttl_secs > MAX_OTP_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "otp.ttl_secs must be in 1..={}",
                MAX_OTP_TTL_SECS
            )));
        }
        if self.root.email.trim().is_empty() {
            return Err(ConfigError::Invalid("root.email is empty".into()));
        }
        if self.root.password_hash.is_empty() {
            return Err(ConfigError::Invalid(
                "root.password_hash is empty; run `assura hash-password` first".into(),
            ));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// `{data_dir}/data.sqlite`
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir().join("data.sqlite")
    }

    /// `{data_dir}/data.redb`
    pub fn kv_path(&self) -> PathBuf {
        self.data_dir().join("data.redb")
    }

    /// `{data_dir}/blobs`
    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir().join("blobs")
    }
}
