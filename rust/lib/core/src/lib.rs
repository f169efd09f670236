//! Shared building blocks for the Assura back-office modules: the unified
//! error type, the injectable clock, the notification contract and server
//! configuration.

pub mod clock;
pub mod config;
pub mod error;
pub mod notify;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ServerConfig};
pub use error::ServiceError;
pub use notify::{LogNotifier, MemoryNotifier, Notifier, NotifyError, OutboundMessage, ReviewerDirectory};
pub use types::{new_id, trimmed};
