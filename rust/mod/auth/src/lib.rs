//! Admin identity and authentication.
//!
//! # Resources
//!
//! - **ContactSubmission** — prior contact form; the only way in for new admins
//! - **AdminAccount** — `STANDARD` (one-time code login) or `PRIVILEGED` (password)
//! - **OtpChallenge** — pending code per account, kept in the KV store
//! - **SessionToken** — HS256 JWT issued after a successful login
//!
//! # Usage
//!
//! ```ignore
//! use assura_auth::{AuthConfig, AuthService};
//!
//! let auth = AuthService::new(sql, kv, notifier, clock, AuthConfig::default())?;
//! let account = auth.register(candidate)?;
//! let outcome = auth.login(LoginRequest { email, password: None })?;
//! ```

pub mod identity;
pub mod model;
pub mod service;

pub use identity::{ContactDirectory, FieldMismatch, IdentityField, IdentityMatch};
pub use service::password::{hash_password, verify_password};
pub use service::{AuthConfig, AuthError, AuthService};
