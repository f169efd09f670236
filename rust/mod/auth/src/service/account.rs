use tracing::{info, warn};

use assura_core::{new_id, ReviewerDirectory, ServiceError};
use assura_store::Value;

use crate::model::{AdminAccount, NewPrivilegedAccount, Role, UpdateAccount};
use crate::service::login::otp_key;
use crate::service::password::hash_password;
use crate::service::{AuthError, AuthService};

fn columns(account: &AdminAccount) -> [(&'static str, Value); 4] {
    [
        ("email", Value::text(&account.email)),
        ("role", Value::text(account.role.as_str())),
        ("created_at", Value::text(account.created_at.to_rfc3339())),
        ("updated_at", Value::text(account.updated_at.to_rfc3339())),
    ]
}

impl AuthService {
    /// Insert a fully-built account. A taken email is a `Conflict`.
    pub(crate) fn insert_account(&self, account: &AdminAccount) -> Result<(), AuthError> {
        self.accounts
            .insert(&account.id, account, &columns(account))
            .map_err(|e| {
                if e.is_constraint() {
                    AuthError::Conflict(format!("email '{}' is already registered", account.email))
                } else {
                    e.into()
                }
            })
    }

    fn save_account(&self, account: &AdminAccount) -> Result<(), AuthError> {
        let found = self
            .accounts
            .update(&account.id, account, &columns(account))
            .map_err(|e| {
                if e.is_constraint() {
                    AuthError::Conflict(format!("email '{}' is already registered", account.email))
                } else {
                    e.into()
                }
            })?;
        if !found {
            return Err(AuthError::AccountNotFound(account.id.clone()));
        }
        Ok(())
    }

    /// Create a password-login account directly, bypassing contact matching.
    pub fn create_privileged_account(
        &self,
        input: NewPrivilegedAccount,
        password: &str,
    ) -> Result<AdminAccount, AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }
        let hash = hash_password(password)?;
        self.insert_privileged(input, hash)
    }

    /// Make sure a privileged account exists for `input.email`, storing the
    /// given PHC hash if it has to be created. Returns the account and
    /// whether it was created by this call.
    pub fn ensure_privileged_account(
        &self,
        input: NewPrivilegedAccount,
        password_hash: &str,
    ) -> Result<(AdminAccount, bool), AuthError> {
        if let Some(existing) = self.find_account_by_email(&input.email)? {
            if existing.role != Role::Privileged {
                warn!(email = %existing.email, "bootstrap account exists but is not privileged");
            }
            return Ok((existing, false));
        }
        let account = self.insert_privileged(input, password_hash.to_string())?;
        Ok((account, true))
    }

    fn insert_privileged(
        &self,
        input: NewPrivilegedAccount,
        password_hash: String,
    ) -> Result<AdminAccount, AuthError> {
        let email = input.email.trim().to_string();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }

        let now = self.clock.now();
        let account = AdminAccount {
            id: new_id(),
            username: input.username.trim().to_string(),
            email,
            pan_number: input.pan_number.trim().to_string(),
            mobile_number: input.mobile_number.trim().to_string(),
            password_hash: Some(password_hash),
            role: Role::Privileged,
            created_at: now,
            updated_at: now,
        };
        self.insert_account(&account)?;

        info!(account = %account.id, email = %account.email, "privileged account created");
        Ok(account)
    }

    pub fn get_account(&self, id: &str) -> Result<AdminAccount, AuthError> {
        self.accounts
            .get(id)?
            .ok_or_else(|| AuthError::AccountNotFound(id.to_string()))
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AuthError> {
        Ok(self.accounts.find_first(&[("email", Value::text(email.trim()))])?)
    }

    pub fn list_accounts(&self) -> Result<Vec<AdminAccount>, AuthError> {
        Ok(self.accounts.find(&[])?)
    }

    pub fn list_accounts_by_role(&self, role: Role) -> Result<Vec<AdminAccount>, AuthError> {
        Ok(self.accounts.find(&[("role", Value::text(role.as_str()))])?)
    }

    /// Replace the editable fields of an account. The password hash is kept.
    pub fn update_account(&self, id: &str, input: UpdateAccount) -> Result<AdminAccount, AuthError> {
        let mut account = self.get_account(id)?;
        let email = input.email.trim().to_string();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }

        account.username = input.username.trim().to_string();
        account.email = email;
        account.pan_number = input.pan_number.trim().to_string();
        account.mobile_number = input.mobile_number.trim().to_string();
        account.role = input.role;
        account.updated_at = self.clock.now();
        self.save_account(&account)?;

        info!(account = %id, role = %account.role, "account updated");
        Ok(account)
    }

    /// Replace the stored password hash.
    pub fn set_password(&self, id: &str, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }
        let mut account = self.get_account(id)?;
        account.password_hash = Some(hash_password(password)?);
        account.updated_at = self.clock.now();
        self.save_account(&account)?;

        info!(account = %id, "password changed");
        Ok(())
    }

    /// Delete an account and any pending one-time code.
    pub fn delete_account(&self, id: &str) -> Result<(), AuthError> {
        if !self.accounts.delete(id)? {
            return Err(AuthError::AccountNotFound(id.to_string()));
        }
        self.kv.delete(&otp_key(id))?;

        info!(account = %id, "account deleted");
        Ok(())
    }
}

impl ReviewerDirectory for AuthService {
    /// The oldest privileged account reviews user uploads.
    fn reviewer_email(&self) -> Result<Option<String>, ServiceError> {
        let reviewers = self.list_accounts_by_role(Role::Privileged)?;
        Ok(reviewers.into_iter().next().map(|a| a.email))
    }
}
