use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Approval state of a purchased policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    Pending,
    Active,
    Rejected,
}

impl Default for PolicyStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Pending => "PENDING",
            PolicyStatus::Active => "ACTIVE",
            PolicyStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(PolicyStatus::Pending),
            "ACTIVE" => Ok(PolicyStatus::Active),
            "REJECTED" => Ok(PolicyStatus::Rejected),
            other => Err(format!("unknown policy status '{}'", other)),
        }
    }
}

/// A user's purchase of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPolicy {
    pub id: String,

    pub user_id: String,

    /// Display name of the insured user.
    #[serde(default)]
    pub user_name: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,

    /// National identity number.
    #[serde(default)]
    pub aadhaar_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    pub plan_id: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default)]
    pub nominee: String,

    #[serde(default)]
    pub nominee_relation: String,

    #[serde(default)]
    pub status: PolicyStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase input. A `status` sent by the caller is accepted on the wire
/// and ignored: new policies always start PENDING.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub aadhaar_number: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub plan_id: String,
    #[serde(default)]
    pub nominee: String,
    #[serde(default)]
    pub nominee_relation: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Administrative full overwrite of a policy's mutable fields, status
/// included.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserPolicy {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub aadhaar_number: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub plan_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub nominee: String,
    #[serde(default)]
    pub nominee_relation: String,
    pub status: PolicyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings() {
        assert_eq!(PolicyStatus::default(), PolicyStatus::Pending);
        assert_eq!("active".parse::<PolicyStatus>().unwrap(), PolicyStatus::Active);
        assert!("CANCELLED".parse::<PolicyStatus>().is_err());
        assert_eq!(serde_json::to_string(&PolicyStatus::Rejected).unwrap(), "\"REJECTED\"");
    }

    #[test]
    fn purchase_request_accepts_status() {
        let req: PurchaseRequest = serde_json::from_str(
            r#"{"user_id":"u1","plan_id":"p1","status":"ACTIVE","dob":"1990-04-01"}"#,
        )
        .unwrap();
        assert_eq!(req.status.as_deref(), Some("ACTIVE"));
        assert_eq!(req.dob, NaiveDate::from_ymd_opt(1990, 4, 1));
    }
}
