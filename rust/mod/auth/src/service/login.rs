use chrono::TimeDelta;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::model::{
    AdminAccount, LoginOutcome, LoginRequest, OtpChallenge, Role, SessionToken, VerifyOtpRequest,
};
use crate::service::password::verify_password;
use crate::service::{AuthError, AuthService};

pub const OTP_SUBJECT: &str = "Your Login OTP";

/// KV key of the pending one-time code for an account.
pub(crate) fn otp_key(account_id: &str) -> String {
    format!("auth/otp/{}", account_id)
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

impl AuthService {
    /// First login step. Privileged accounts authenticate with their
    /// password; standard accounts are mailed a one-time code.
    pub fn login(&self, req: LoginRequest) -> Result<LoginOutcome, AuthError> {
        let account = match self.find_account_by_email(&req.email)? {
            Some(a) => a,
            None => {
                debug!(email = %req.email.trim(), "login for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        match account.role {
            Role::Privileged => {
                let token = self.login_with_password(&account, req.password.as_deref())?;
                Ok(LoginOutcome::Authenticated(token))
            }
            Role::Standard => {
                self.send_otp(&account)?;
                Ok(LoginOutcome::OtpSent {
                    email: account.email,
                    valid_for_secs: self.config.otp_ttl,
                })
            }
        }
    }

    fn login_with_password(
        &self,
        account: &AdminAccount,
        password: Option<&str>,
    ) -> Result<SessionToken, AuthError> {
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => {
                debug!(account = %account.id, "privileged login without password");
                return Err(AuthError::InvalidCredentials);
            }
        };
        let stored = match account.password_hash.as_deref() {
            Some(h) => h,
            None => {
                warn!(account = %account.id, "privileged account has no password hash");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !verify_password(password, stored)? {
            warn!(account = %account.id, "wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(account = %account.id, "privileged login");
        self.issue_token(account)
    }

    /// Store a fresh code (replacing any pending one) and mail it. If the
    /// mail cannot be sent the code is withdrawn.
    fn send_otp(&self, account: &AdminAccount) -> Result<(), AuthError> {
        let challenge = OtpChallenge {
            code: generate_code(),
            issued_at: Some(self.clock.now()),
        };
        let raw = serde_json::to_vec(&challenge).map_err(|e| AuthError::Internal(e.to_string()))?;
        let key = otp_key(&account.id);
        self.kv.set(&key, &raw)?;

        let body = format!(
            "Your OTP is: {}\n\nNote: This OTP is valid for {}.",
            challenge.code,
            describe_ttl(self.config.otp_ttl)
        );
        if let Err(e) = self.notifier.send(&account.email, OTP_SUBJECT, &body) {
            warn!(account = %account.id, error = %e, "OTP mail failed; challenge withdrawn");
            self.kv.take_if(&key, &raw)?;
            return Err(AuthError::NotificationFailed(e.to_string()));
        }

        info!(account = %account.id, "OTP issued");
        Ok(())
    }

    /// Second login step for standard accounts.
    ///
    /// A wrong code leaves the challenge in place. Any call that gets past
    /// the code comparison consumes the challenge, whether it then succeeds
    /// or is judged expired.
    pub fn verify_otp(&self, req: VerifyOtpRequest) -> Result<SessionToken, AuthError> {
        let account = self
            .find_account_by_email(&req.email)?
            .ok_or_else(|| AuthError::AccountNotFound(req.email.trim().to_string()))?;

        let supplied = req.otp.as_deref().unwrap_or("");
        let key = otp_key(&account.id);
        let raw = match self.kv.get(&key)? {
            Some(raw) if !supplied.trim().is_empty() => raw,
            _ => return Err(AuthError::OtpMissingOrEmpty),
        };

        let challenge = match serde_json::from_slice::<OtpChallenge>(&raw) {
            Ok(c) => c,
            Err(e) => {
                warn!(account = %account.id, error = %e, "unreadable OTP challenge discarded");
                self.kv.take_if(&key, &raw)?;
                return Err(AuthError::OtpExpired);
            }
        };

        if challenge.code != supplied {
            debug!(account = %account.id, "OTP mismatch");
            return Err(AuthError::OtpMismatch);
        }

        if !self.kv.take_if(&key, &raw)? {
            debug!(account = %account.id, "OTP consumed concurrently");
            return Err(AuthError::OtpMissingOrEmpty);
        }

        let ttl = TimeDelta::try_seconds(self.config.otp_ttl).ok_or_else(|| {
            AuthError::Internal(format!("OTP lifetime {}s out of range", self.config.otp_ttl))
        })?;
        let now = self.clock.now();
        let fresh = challenge
            .issued_at
            .map(|at| now.signed_duration_since(at) < ttl)
            .unwrap_or(false);
        if !fresh {
            info!(account = %account.id, "OTP expired");
            return Err(AuthError::OtpExpired);
        }

        info!(account = %account.id, "OTP verified");
        self.issue_token(&account)
    }

    /// The pending challenge for an account, if any.
    pub fn pending_otp(&self, account_id: &str) -> Result<Option<OtpChallenge>, AuthError> {
        match self.kv.get(&otp_key(account_id))? {
            Some(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| AuthError::Internal(e.to_string())),
            None => Ok(None),
        }
    }
}

fn describe_ttl(secs: i64) -> String {
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}
