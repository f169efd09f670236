use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// A pending one-time code for a standard account.
///
/// Code and issuance time travel together in one value, so one can never be
/// stored without the other. A value without `issued_at` (written by an
/// older build, or damaged) is treated as already expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Exactly six ASCII digits.
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
}

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: account email.
    pub sub: String,

    pub role: Role,

    /// Account id.
    pub aid: String,

    /// Username at issuance time.
    pub name: String,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Signed bearer token plus the account it was issued to.
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub account_id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

/// Login request. `password` is only consulted for privileged accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Result of the first login step.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Privileged account: password accepted, token issued.
    Authenticated(SessionToken),
    /// Standard account: a code was mailed; call `verify_otp` next.
    OtpSent { email: String, valid_for_secs: i64 },
}

/// Second login step for standard accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(default)]
    pub otp: Option<String>,
}
