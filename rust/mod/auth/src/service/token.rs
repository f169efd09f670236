use chrono::TimeDelta;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::model::{AdminAccount, Claims, SessionToken};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Sign a session token for an account.
    pub fn issue_token(&self, account: &AdminAccount) -> Result<SessionToken, AuthError> {
        let now = self.clock.now();
        let exp = TimeDelta::try_seconds(self.config.access_token_ttl)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Internal(format!(
                    "token lifetime {}s out of range",
                    self.config.access_token_ttl
                ))
            })?;

        let claims = Claims {
            sub: account.email.clone(),
            role: account.role,
            aid: account.id.clone(),
            name: account.username.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("JWT encode failed: {}", e)))?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
            account_id: account.id.clone(),
            email: account.email.clone(),
            username: account.username.clone(),
            role: account.role,
        })
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        // Expiry is judged against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {}", e)))?;

        if data.claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::Unauthorized("token expired".into()));
        }
        Ok(data.claims)
    }
}
