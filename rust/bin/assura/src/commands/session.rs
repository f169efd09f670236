//! Login flow from the terminal, mostly for trying out a deployment.

use anyhow::Result;

use assura_auth::model::{LoginOutcome, LoginRequest, SessionToken, VerifyOtpRequest};
use assura_core::ServerConfig;

use super::Services;

pub fn login(config: &ServerConfig, email: &str, prompt_password: bool) -> Result<()> {
    let password = if prompt_password {
        Some(rpassword::prompt_password("Password: ")?)
    } else {
        None
    };

    let services = Services::open(config)?;
    match services.auth.login(LoginRequest {
        email: email.to_string(),
        password,
    })? {
        LoginOutcome::Authenticated(token) => print_token(&token)?,
        LoginOutcome::OtpSent {
            email,
            valid_for_secs,
        } => {
            println!("One-time code sent to {} (valid for {}s).", email, valid_for_secs);
            println!("Run `assura verify-otp --email {} --otp <code>`.", email);
        }
    }
    Ok(())
}

pub fn verify_otp(config: &ServerConfig, email: &str, otp: &str) -> Result<()> {
    let services = Services::open(config)?;
    let token = services.auth.verify_otp(VerifyOtpRequest {
        email: email.to_string(),
        otp: Some(otp.to_string()),
    })?;
    print_token(&token)
}

pub fn check_token(config: &ServerConfig, token: &str) -> Result<()> {
    let services = Services::open(config)?;
    let claims = services.auth.verify_token(token)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}

fn print_token(token: &SessionToken) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(token)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bootstrap::ensure_root;
    use crate::commands::testutil::config_in;

    #[test]
    fn token_from_one_open_verifies_in_another() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let token = {
            let services = Services::open(&config).unwrap();
            let root = ensure_root(&services, &config).unwrap();
            services.auth.issue_token(&root).unwrap()
        };

        check_token(&config, &token.access_token).unwrap();
        assert!(check_token(&config, "garbage").is_err());
    }
}
