//! Identity verification: a registration candidate must match a contact
//! submission on record, field by field.

use std::fmt;

use assura_core::trimmed;

use crate::model::{ContactSubmission, RegisterAdmin};
use crate::service::AuthError;

/// Lookup of prior contact submissions. When several submissions share a
/// key the oldest one is returned.
pub trait ContactDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<ContactSubmission>, AuthError>;
    fn find_by_pan(&self, pan_number: &str) -> Result<Option<ContactSubmission>, AuthError>;
}

/// The four fields compared during verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Username,
    Email,
    PanNumber,
    MobileNumber,
}

impl IdentityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityField::Username => "username",
            IdentityField::Email => "email",
            IdentityField::PanNumber => "pan_number",
            IdentityField::MobileNumber => "mobile_number",
        }
    }
}

/// One differing field, with both trimmed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: IdentityField,
    pub contact: String,
    pub candidate: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} does not match contact record. contact='{}' vs admin='{}'",
            self.field.as_str(),
            self.contact,
            self.candidate
        )
    }
}

/// Result of a verification that found a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMatch {
    pub contact_id: String,
    /// Empty means every field matched.
    pub mismatches: Vec<FieldMismatch>,
}

impl IdentityMatch {
    pub fn is_full_match(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Find the submission for `candidate` (email first, then PAN) and compare
/// the four identity fields exactly after trimming.
pub fn verify(
    directory: &dyn ContactDirectory,
    candidate: &RegisterAdmin,
) -> Result<IdentityMatch, AuthError> {
    let email = trimmed(candidate.email.as_deref());
    let pan = trimmed(candidate.pan_number.as_deref());

    let mut contact = None;
    if !email.is_empty() {
        contact = directory.find_by_email(email)?;
    }
    if contact.is_none() && !pan.is_empty() {
        contact = directory.find_by_pan(pan)?;
    }
    let contact = contact.ok_or(AuthError::NoMatchingRecord)?;

    let pairs = [
        (IdentityField::Username, &contact.name, candidate.username.as_deref()),
        (IdentityField::Email, &contact.email, candidate.email.as_deref()),
        (IdentityField::PanNumber, &contact.pan_number, candidate.pan_number.as_deref()),
        (IdentityField::MobileNumber, &contact.mobile_number, candidate.mobile_number.as_deref()),
    ];

    let mismatches = pairs
        .into_iter()
        .filter_map(|(field, on_record, given)| {
            let on_record = on_record.trim();
            let given = trimmed(given);
            (on_record != given).then(|| FieldMismatch {
                field,
                contact: on_record.to_string(),
                candidate: given.to_string(),
            })
        })
        .collect();

    Ok(IdentityMatch {
        contact_id: contact.id,
        mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[derive(Default)]
    struct Contacts(Vec<ContactSubmission>);

    impl ContactDirectory for Contacts {
        fn find_by_email(&self, email: &str) -> Result<Option<ContactSubmission>, AuthError> {
            Ok(self.0.iter().find(|c| c.email.trim() == email).cloned())
        }

        fn find_by_pan(&self, pan: &str) -> Result<Option<ContactSubmission>, AuthError> {
            Ok(self.0.iter().find(|c| c.pan_number.trim() == pan).cloned())
        }
    }

    fn ravi() -> ContactSubmission {
        ContactSubmission {
            id: "c1".into(),
            name: "Ravi".into(),
            email: "ravi@x.com".into(),
            pan_number: "ABCDE1234F".into(),
            mobile_number: "9876543210".into(),
            created_at: Utc::now(),
        }
    }

    fn candidate(username: &str, email: &str, pan: &str, mobile: &str) -> RegisterAdmin {
        RegisterAdmin {
            username: Some(username.into()),
            email: Some(email.into()),
            pan_number: Some(pan.into()),
            mobile_number: Some(mobile.into()),
        }
    }

    #[test]
    fn empty_directory_has_no_match() {
        let dir = Contacts::default();
        let err = verify(&dir, &candidate("Ravi", "ravi@x.com", "ABCDE1234F", "1")).unwrap_err();
        assert!(matches!(err, AuthError::NoMatchingRecord));
    }

    #[test]
    fn full_match_after_trim() {
        let dir = Contacts(vec![ravi()]);
        let m = verify(
            &dir,
            &candidate(" Ravi ", "ravi@x.com ", " ABCDE1234F", "9876543210"),
        )
        .unwrap();
        assert!(m.is_full_match());
        assert_eq!(m.contact_id, "c1");
    }

    #[test]
    fn case_difference_is_a_single_mismatch() {
        let dir = Contacts(vec![ravi()]);
        let m = verify(&dir, &candidate("ravi", "ravi@x.com", "ABCDE1234F", "9876543210")).unwrap();
        assert_eq!(m.mismatches.len(), 1);
        assert_eq!(m.mismatches[0].field, IdentityField::Username);
        assert_eq!(m.mismatches[0].contact, "Ravi");
        assert_eq!(m.mismatches[0].candidate, "ravi");
    }

    #[test]
    fn falls_back_to_pan_when_email_unknown() {
        let dir = Contacts(vec![ravi()]);
        let m = verify(&dir, &candidate("Ravi", "other@x.com", "ABCDE1234F", "9876543210")).unwrap();
        assert_eq!(m.mismatches.len(), 1);
        assert_eq!(m.mismatches[0].field, IdentityField::Email);
        assert_eq!(
            m.mismatches[0].to_string(),
            "email does not match contact record. contact='ravi@x.com' vs admin='other@x.com'"
        );
    }

    #[test]
    fn missing_fields_compare_as_empty() {
        let dir = Contacts(vec![ravi()]);
        let m = verify(
            &dir,
            &RegisterAdmin {
                email: Some("ravi@x.com".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let fields: Vec<_> = m.mismatches.iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![IdentityField::Username, IdentityField::PanNumber, IdentityField::MobileNumber]
        );
        assert!(m.mismatches.iter().all(|f| f.candidate.is_empty()));
    }
}
