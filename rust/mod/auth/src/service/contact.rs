use tracing::info;

use assura_core::new_id;
use assura_store::Value;

use crate::identity::ContactDirectory;
use crate::model::{ContactSubmission, SubmitContact};
use crate::service::{AuthError, AuthService};

impl AuthService {
    /// Record a contact form. Values are stored trimmed.
    pub fn submit_contact(&self, input: SubmitContact) -> Result<ContactSubmission, AuthError> {
        let contact = ContactSubmission {
            id: new_id(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            pan_number: input.pan_number.trim().to_string(),
            mobile_number: input.mobile_number.trim().to_string(),
            created_at: self.clock.now(),
        };

        self.contacts.insert(
            &contact.id,
            &contact,
            &[
                ("email", Value::text(&contact.email)),
                ("pan_number", Value::text(&contact.pan_number)),
                ("created_at", Value::text(contact.created_at.to_rfc3339())),
            ],
        )?;

        info!(contact = %contact.id, "contact submission recorded");
        Ok(contact)
    }

    pub fn list_contacts(&self) -> Result<Vec<ContactSubmission>, AuthError> {
        Ok(self.contacts.find(&[])?)
    }

    pub fn find_contact_by_email(&self, email: &str) -> Result<Option<ContactSubmission>, AuthError> {
        Ok(self.contacts.find_first(&[("email", Value::text(email.trim()))])?)
    }

    pub fn find_contact_by_pan(&self, pan_number: &str) -> Result<Option<ContactSubmission>, AuthError> {
        Ok(self
            .contacts
            .find_first(&[("pan_number", Value::text(pan_number.trim()))])?)
    }
}

impl ContactDirectory for AuthService {
    fn find_by_email(&self, email: &str) -> Result<Option<ContactSubmission>, AuthError> {
        self.find_contact_by_email(email)
    }

    fn find_by_pan(&self, pan_number: &str) -> Result<Option<ContactSubmission>, AuthError> {
        self.find_contact_by_pan(pan_number)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::model::SubmitContact;
    use crate::service::testutil::harness;

    fn form(name: &str, email: &str, pan: &str) -> SubmitContact {
        SubmitContact {
            name: name.into(),
            email: email.into(),
            pan_number: pan.into(),
            mobile_number: "9876543210".into(),
        }
    }

    #[test]
    fn submit_trims_and_finds() {
        let h = harness();
        let c = h.svc.submit_contact(form(" Ravi ", " ravi@x.com ", "ABCDE1234F")).unwrap();
        assert_eq!(c.name, "Ravi");
        assert_eq!(c.email, "ravi@x.com");

        assert_eq!(h.svc.find_contact_by_email("ravi@x.com").unwrap().unwrap().id, c.id);
        assert_eq!(h.svc.find_contact_by_pan(" ABCDE1234F").unwrap().unwrap().id, c.id);
        assert!(h.svc.find_contact_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_resolves_to_oldest() {
        let h = harness();
        let first = h.svc.submit_contact(form("Ravi", "ravi@x.com", "P1")).unwrap();
        h.clock.advance(Duration::seconds(5));
        h.svc.submit_contact(form("Ravi K", "ravi@x.com", "P2")).unwrap();

        assert_eq!(h.svc.list_contacts().unwrap().len(), 2);
        assert_eq!(h.svc.find_contact_by_email("ravi@x.com").unwrap().unwrap().id, first.id);
    }
}
