use tracing::{info, warn};

use assura_core::{new_id, trimmed};

use crate::identity;
use crate::model::{AdminAccount, RegisterAdmin, Role};
use crate::service::{AuthError, AuthService};

pub const WELCOME_SUBJECT: &str = "Congratulations! You have been added as an Admin";

impl AuthService {
    /// Register a standard admin whose details match a contact submission.
    ///
    /// Nothing is written unless all four identity fields match. The welcome
    /// mail is best effort: a delivery failure is logged and the account is
    /// kept.
    pub fn register(&self, input: RegisterAdmin) -> Result<AdminAccount, AuthError> {
        let matched = identity::verify(self, &input)?;
        if !matched.is_full_match() {
            info!(
                contact = %matched.contact_id,
                fields = matched.mismatches.len(),
                "registration rejected: identity mismatch"
            );
            return Err(AuthError::FieldMismatch(matched.mismatches));
        }

        let email = trimmed(input.email.as_deref()).to_string();
        if email.is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }

        let now = self.clock.now();
        let account = AdminAccount {
            id: new_id(),
            username: trimmed(input.username.as_deref()).to_string(),
            email,
            pan_number: trimmed(input.pan_number.as_deref()).to_string(),
            mobile_number: trimmed(input.mobile_number.as_deref()).to_string(),
            password_hash: None,
            role: Role::Standard,
            created_at: now,
            updated_at: now,
        };
        self.insert_account(&account)?;
        info!(account = %account.id, contact = %matched.contact_id, "admin registered");

        let body = format!(
            "Dear {},\n\nYour admin account has been created. Sign in with {} to receive a one-time code.",
            account.username, account.email
        );
        if let Err(e) = self.notifier.send(&account.email, WELCOME_SUBJECT, &body) {
            warn!(account = %account.id, error = %e, "welcome mail not delivered");
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityField;
    use crate::model::SubmitContact;
    use crate::service::testutil::{harness, Harness};

    fn seed(h: &Harness) {
        h.svc
            .submit_contact(SubmitContact {
                name: "Ravi".into(),
                email: "ravi@x.com".into(),
                pan_number: "ABCDE1234F".into(),
                mobile_number: "9876543210".into(),
            })
            .unwrap();
    }

    fn ravi(username: &str) -> RegisterAdmin {
        RegisterAdmin {
            username: Some(username.into()),
            email: Some("ravi@x.com".into()),
            pan_number: Some("ABCDE1234F".into()),
            mobile_number: Some("9876543210".into()),
        }
    }

    #[test]
    fn empty_contact_store_rejects() {
        let h = harness();
        let err = h.svc.register(ravi("Ravi")).unwrap_err();
        assert!(matches!(err, AuthError::NoMatchingRecord));
        assert!(h.svc.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn username_case_mismatch_rejects() {
        let h = harness();
        seed(&h);
        match h.svc.register(ravi("ravi")).unwrap_err() {
            AuthError::FieldMismatch(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].field, IdentityField::Username);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(h.svc.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn full_match_creates_standard_account() {
        let h = harness();
        seed(&h);
        let a = h.svc.register(ravi(" Ravi ")).unwrap();
        assert_eq!(a.role, Role::Standard);
        assert_eq!(a.username, "Ravi");
        assert!(a.password_hash.is_none());

        let mail = h.notifier.last_to("ravi@x.com").unwrap();
        assert_eq!(mail.subject, WELCOME_SUBJECT);

        let again = h.svc.register(ravi("Ravi")).unwrap_err();
        assert!(matches!(again, AuthError::Conflict(_)));
    }

    #[test]
    fn welcome_mail_failure_keeps_account() {
        let h = harness();
        seed(&h);
        h.notifier.set_failing(true);
        let a = h.svc.register(ravi("Ravi")).unwrap();
        assert_eq!(h.svc.get_account(&a.id).unwrap().email, "ravi@x.com");
        assert!(h.notifier.messages().is_empty());
    }
}
