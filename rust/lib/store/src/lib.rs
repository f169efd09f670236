//! Embedded storage backends: SQL records, a small KV store for volatile
//! state, and blob storage for uploaded files.

pub mod blob;
pub mod error;
pub mod kv;
pub mod records;
pub mod sql;

pub use blob::{BlobStore, FileStore};
pub use error::StoreError;
pub use kv::{KVStore, RedbStore};
pub use records::JsonTable;
pub use sql::{Row, SQLStore, SqliteStore, Value};
