use anyhow::Result;

/// Print the argon2id hash of a password given on the command line or
/// prompted for interactively.
pub fn hash(password: Option<String>) -> Result<()> {
    let password = if let Some(p) = password {
        // Non-interactive mode (CI/automation).
        if p.is_empty() {
            anyhow::bail!("Password cannot be empty.");
        }
        p
    } else {
        let pw = rpassword::prompt_password("Enter password: ")?;
        let confirm = rpassword::prompt_password("Confirm password: ")?;
        if pw != confirm {
            anyhow::bail!("Passwords do not match.");
        }
        if pw.is_empty() {
            anyhow::bail!("Password cannot be empty.");
        }
        pw
    };

    println!("{}", assura_auth::hash_password(&password)?);
    Ok(())
}
