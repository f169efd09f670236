use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact form submitted by a prospective admin. Immutable once stored;
/// registration is only allowed when it matches one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,

    /// Full name. Must equal the registering username.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub pan_number: String,

    #[serde(default)]
    pub mobile_number: String,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a contact submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub pan_number: String,
    #[serde(default)]
    pub mobile_number: String,
}
