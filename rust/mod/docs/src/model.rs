use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a document belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentOwner {
    User(String),
    Claim(String),
}

impl DocumentOwner {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentOwner::User(_) => "USER",
            DocumentOwner::Claim(_) => "CLAIM",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DocumentOwner::User(id) | DocumentOwner::Claim(id) => id,
        }
    }
}

impl fmt::Display for DocumentOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Metadata of a stored upload. The bytes live in the blob store under
/// `stored_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    pub owner: DocumentOwner,

    /// Name shown to people, e.g. "PAN card".
    pub display_name: String,

    /// Free-form category label, e.g. "ID_PROOF".
    #[serde(default)]
    pub document_type: String,

    /// File name as uploaded (unsanitized).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,

    /// `{uuid}_{sanitized name}`.
    pub stored_name: String,

    /// Blob key.
    pub stored_key: String,

    /// Lower-cased, trimmed.
    pub content_type: String,

    pub size: u64,

    pub uploaded_at: DateTime<Utc>,
}

/// An incoming file.
#[derive(Debug, Clone, Default)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: &str, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file that passed validation and was written to the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_name: String,
    pub stored_key: String,
    pub content_type: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_serializes_tagged() {
        let json = serde_json::to_string(&DocumentOwner::Claim("c9".into())).unwrap();
        assert_eq!(json, r#"{"kind":"CLAIM","id":"c9"}"#);
        assert_eq!(DocumentOwner::User("u1".into()).to_string(), "USER:u1");
    }
}
