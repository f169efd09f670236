use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An insurance product offered by one admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyPlan {
    pub id: String,

    /// The admin account that owns this plan and reviews its purchases.
    pub admin_id: String,

    pub name: String,

    /// Product line, e.g. "HEALTH", "LIFE". Free-form.
    #[serde(default)]
    pub policy_type: String,

    pub premium: f64,

    pub coverage: f64,

    pub duration_years: u32,

    /// Blob key of the plan's image, if one was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    #[serde(default)]
    pub policy_type: String,
    pub premium: f64,
    pub coverage: f64,
    pub duration_years: u32,
}
