//! Document uploads for users and insurance claims.
//!
//! Files are checked against a small allow-list of content types and a size
//! cap, written to a [`assura_store::BlobStore`] under a collision-free name,
//! and described by a metadata record in SQL.

pub mod config;
pub mod model;
pub mod service;

pub use config::{sanitize_filename, DocumentConfig};
pub use service::{DocumentError, DocumentService};
