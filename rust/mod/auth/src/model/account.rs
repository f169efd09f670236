use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which login path an account takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// One-time code by email; no password.
    Standard,
    /// Password login; no one-time code.
    Privileged,
}

impl Default for Role {
    fn default() -> Self {
        Self::Standard
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "STANDARD",
            Role::Privileged => "PRIVILEGED",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STANDARD" => Ok(Role::Standard),
            "PRIVILEGED" => Ok(Role::Privileged),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    pub username: String,

    /// Login identifier. Unique across accounts.
    pub email: String,

    #[serde(default)]
    pub pan_number: String,

    #[serde(default)]
    pub mobile_number: String,

    /// argon2id PHC string. Only privileged accounts carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub role: Role,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input, checked against a prior contact submission.
///
/// Every field is optional on the wire; a missing field compares as the
/// empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterAdmin {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pan_number: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

/// Input for creating a privileged account directly (bootstrap).
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrivilegedAccount {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub pan_number: String,
    #[serde(default)]
    pub mobile_number: String,
}

/// Full replacement of an account's editable fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAccount {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub pan_number: String,
    #[serde(default)]
    pub mobile_number: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_and_prints() {
        assert_eq!("privileged".parse::<Role>().unwrap(), Role::Privileged);
        assert_eq!(" STANDARD ".parse::<Role>().unwrap(), Role::Standard);
        assert!("SUPER".parse::<Role>().is_err());
        assert_eq!(Role::Privileged.to_string(), "PRIVILEGED");
        assert_eq!(
            serde_json::to_string(&Role::Standard).unwrap(),
            "\"STANDARD\""
        );
    }
}
