use tracing::{debug, info, warn};

use assura_core::new_id;
use assura_store::Value;

use crate::config::sanitize_filename;
use crate::model::{Document, DocumentOwner, StoredFile, UploadFile};
use crate::service::{DocumentError, DocumentService};

pub const UPLOAD_SUBJECT: &str = "Document Uploaded Successfully";

const FILE_PREFIX: &str = "files";

fn owner_columns(doc: &Document) -> [(&'static str, Value); 2] {
    [
        ("owner_kind", Value::text(doc.owner.kind())),
        ("owner_id", Value::text(doc.owner.id())),
    ]
}

fn columns(doc: &Document) -> [(&'static str, Value); 3] {
    let [kind, id] = owner_columns(doc);
    [kind, id, ("created_at", Value::text(doc.uploaded_at.to_rfc3339()))]
}

impl DocumentService {
    /// Validate a file and write it to the blob store under a fresh
    /// `{uuid}_{sanitized name}`.
    pub fn store_file(&self, file: &UploadFile) -> Result<StoredFile, DocumentError> {
        let content_type = self.config.validate(file.content_type.as_deref(), file.size())?;
        let stored_name = format!("{}_{}", new_id(), sanitize_filename(file.file_name.as_deref()));
        let stored_key = format!("{}/{}", FILE_PREFIX, stored_name);
        self.blobs.put(&stored_key, &file.bytes)?;

        debug!(key = %stored_key, size = file.size(), "file stored");
        Ok(StoredFile {
            stored_name,
            stored_key,
            content_type,
            size: file.size(),
        })
    }

    /// Bytes of a file written by [`DocumentService::store_file`], by stored name.
    pub fn load_file(&self, stored_name: &str) -> Result<Vec<u8>, DocumentError> {
        let key = format!("{}/{}", FILE_PREFIX, stored_name);
        self.blobs
            .get(&key)?
            .ok_or_else(|| DocumentError::NotFound(format!("file {}", stored_name)))
    }

    /// Store a file and record it for `owner`. A user's upload is announced
    /// to the reviewer; that mail is best effort.
    pub fn upload(
        &self,
        owner: DocumentOwner,
        display_name: &str,
        document_type: &str,
        file: UploadFile,
    ) -> Result<Document, DocumentError> {
        let stored = self.store_file(&file)?;
        let doc = Document {
            id: new_id(),
            owner,
            display_name: display_name.trim().to_string(),
            document_type: document_type.trim().to_string(),
            original_file_name: file.file_name,
            stored_name: stored.stored_name,
            stored_key: stored.stored_key,
            content_type: stored.content_type,
            size: stored.size,
            uploaded_at: self.clock.now(),
        };

        if let Err(e) = self.documents.insert(&doc.id, &doc, &columns(&doc)) {
            if let Err(cleanup) = self.blobs.delete(&doc.stored_key) {
                warn!(key = %doc.stored_key, error = %cleanup, "orphaned blob left behind");
            }
            return Err(e.into());
        }
        info!(document = %doc.id, owner = %doc.owner, size = doc.size, "document uploaded");

        if let DocumentOwner::User(_) = doc.owner {
            self.notify_reviewer(&doc);
        }
        Ok(doc)
    }

    fn notify_reviewer(&self, doc: &Document) {
        let reviewer = match self.reviewers.reviewer_email() {
            Ok(Some(email)) => email,
            Ok(None) => {
                debug!(document = %doc.id, "no reviewer to notify");
                return;
            }
            Err(e) => {
                warn!(document = %doc.id, error = %e, "reviewer lookup failed");
                return;
            }
        };

        let body = format!(
            "A new document \"{}\" ({}) was uploaded by user {}.",
            doc.display_name,
            doc.document_type,
            doc.owner.id()
        );
        if let Err(e) = self.notifier.send(&reviewer, UPLOAD_SUBJECT, &body) {
            warn!(document = %doc.id, error = %e, "upload notice not delivered");
        }
    }

    pub fn get(&self, id: &str) -> Result<Document, DocumentError> {
        self.documents
            .get(id)?
            .ok_or_else(|| DocumentError::NotFound(format!("document {}", id)))
    }

    pub fn list_all(&self) -> Result<Vec<Document>, DocumentError> {
        Ok(self.documents.find(&[])?)
    }

    /// Documents of one owner, oldest first.
    pub fn list_for_owner(&self, owner: &DocumentOwner) -> Result<Vec<Document>, DocumentError> {
        Ok(self.documents.find(&[
            ("owner_kind", Value::text(owner.kind())),
            ("owner_id", Value::text(owner.id())),
        ])?)
    }

    /// Metadata and bytes.
    pub fn read(&self, id: &str) -> Result<(Document, Vec<u8>), DocumentError> {
        let doc = self.get(id)?;
        let bytes = self
            .blobs
            .get(&doc.stored_key)?
            .ok_or_else(|| DocumentError::NotFound(format!("content of document {}", id)))?;
        Ok((doc, bytes))
    }

    /// Rename and/or swap the file. A blank name or a `None` file leaves
    /// that part unchanged. The old blob is removed after the new record
    /// is saved.
    pub fn replace(
        &self,
        id: &str,
        display_name: Option<&str>,
        file: Option<UploadFile>,
    ) -> Result<Document, DocumentError> {
        let mut doc = self.get(id)?;

        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            doc.display_name = name.to_string();
        }

        let mut old_key = None;
        if let Some(file) = file {
            let stored = self.store_file(&file)?;
            old_key = Some(std::mem::replace(&mut doc.stored_key, stored.stored_key));
            doc.stored_name = stored.stored_name;
            doc.content_type = stored.content_type;
            doc.size = stored.size;
            doc.original_file_name = file.file_name;
            doc.uploaded_at = self.clock.now();
        }

        // created_at keeps its first-upload value so listings do not reorder.
        let written = match self.documents.update(id, &doc, &owner_columns(&doc)) {
            Ok(true) => Ok(()),
            Ok(false) => Err(DocumentError::NotFound(format!("document {}", id))),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            if old_key.is_some() {
                if let Err(cleanup) = self.blobs.delete(&doc.stored_key) {
                    warn!(key = %doc.stored_key, error = %cleanup, "orphaned blob left behind");
                }
            }
            return Err(e);
        }
        if let Some(key) = old_key {
            if let Err(e) = self.blobs.delete(&key) {
                warn!(key = %key, error = %e, "old blob not removed");
            }
        }

        info!(document = %id, "document updated");
        Ok(doc)
    }

    /// Remove the record, then its blob.
    pub fn delete(&self, id: &str) -> Result<(), DocumentError> {
        let doc = self.get(id)?;
        if !self.documents.delete(id)? {
            return Err(DocumentError::NotFound(format!("document {}", id)));
        }
        self.blobs.delete(&doc.stored_key)?;

        info!(document = %id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::harness;
    use assura_store::BlobStore;
    use chrono::Duration;

    fn stored_files(h: &crate::service::testutil::Harness) -> usize {
        std::fs::read_dir(h.blob_root.join(FILE_PREFIX))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    fn pdf(name: &str) -> UploadFile {
        UploadFile::new(name, "application/pdf", b"%PDF-1.4 test".to_vec())
    }

    #[test]
    fn upload_stores_and_notifies() {
        let h = harness();
        let doc = h
            .svc
            .upload(DocumentOwner::User("u1".into()), " PAN card ", "ID_PROOF", pdf("pan card.pdf"))
            .unwrap();

        assert_eq!(doc.display_name, "PAN card");
        assert_eq!(doc.content_type, "application/pdf");
        assert!(doc.stored_name.ends_with("_pan_card.pdf"));
        assert_eq!(doc.stored_name.len(), 32 + 1 + "pan_card.pdf".len());
        assert_eq!(doc.original_file_name.as_deref(), Some("pan card.pdf"));

        let (meta, bytes) = h.svc.read(&doc.id).unwrap();
        assert_eq!(meta, doc);
        assert_eq!(bytes, b"%PDF-1.4 test");
        assert_eq!(h.svc.load_file(&doc.stored_name).unwrap(), bytes);

        let mail = h.notifier.last_to("root@x.com").unwrap();
        assert_eq!(mail.subject, UPLOAD_SUBJECT);
        assert!(mail.body.contains("PAN card"));
    }

    #[test]
    fn claim_upload_is_silent() {
        let h = harness();
        h.svc
            .upload(DocumentOwner::Claim("c1".into()), "Bill", "HOSPITAL_BILL", pdf("bill.pdf"))
            .unwrap();
        assert!(h.notifier.messages().is_empty());
    }

    #[test]
    fn notification_is_best_effort() {
        let h = harness();
        h.notifier.set_failing(true);
        let doc = h
            .svc
            .upload(DocumentOwner::User("u1".into()), "Photo", "PHOTO", UploadFile::new("me.png", "IMAGE/PNG", vec![1u8, 2, 3]))
            .unwrap();
        assert_eq!(doc.content_type, "image/png");

        *h.reviewer.0.lock().unwrap() = None;
        h.notifier.set_failing(false);
        h.svc
            .upload(DocumentOwner::User("u1".into()), "Photo 2", "PHOTO", UploadFile::new("me.png", "image/png", vec![1u8]))
            .unwrap();
        assert!(h.notifier.messages().is_empty());
        assert_eq!(h.svc.list_all().unwrap().len(), 2);
    }

    #[test]
    fn rejects_invalid_files_without_storing() {
        let h = harness();
        let owner = DocumentOwner::User("u1".into());

        let err = h
            .svc
            .upload(owner.clone(), "x", "", UploadFile::new("a.txt", "text/plain", b"hi".to_vec()))
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType(_)));

        let err = h
            .svc
            .upload(owner.clone(), "x", "", UploadFile::new("a.pdf", "application/pdf", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, DocumentError::EmptyFile));

        let big = vec![0u8; (h.svc.config().max_bytes + 1) as usize];
        let err = h
            .svc
            .upload(owner.clone(), "x", "", UploadFile::new("a.pdf", "application/pdf", big))
            .unwrap_err();
        assert!(matches!(err, DocumentError::TooLarge { .. }));

        assert!(h.svc.list_for_owner(&owner).unwrap().is_empty());
    }

    #[test]
    fn missing_file_name_becomes_file() {
        let h = harness();
        let doc = h
            .svc
            .upload(
                DocumentOwner::Claim("c1".into()),
                "Scan",
                "",
                UploadFile {
                    file_name: None,
                    content_type: Some("image/jpeg".into()),
                    bytes: vec![0xff, 0xd8],
                },
            )
            .unwrap();
        assert!(doc.stored_name.ends_with("_file"));
    }

    #[test]
    fn list_by_owner() {
        let h = harness();
        h.svc.upload(DocumentOwner::User("u1".into()), "a", "", pdf("a.pdf")).unwrap();
        h.svc.upload(DocumentOwner::User("u2".into()), "b", "", pdf("b.pdf")).unwrap();
        h.svc.upload(DocumentOwner::Claim("u1".into()), "c", "", pdf("c.pdf")).unwrap();

        let mine = h.svc.list_for_owner(&DocumentOwner::User("u1".into())).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].display_name, "a");
    }

    #[test]
    fn replace_swaps_blob() {
        let h = harness();
        let doc = h
            .svc
            .upload(DocumentOwner::User("u1".into()), "Aadhaar", "ID_PROOF", pdf("old.pdf"))
            .unwrap();

        let renamed = h.svc.replace(&doc.id, Some("Aadhaar card"), None).unwrap();
        assert_eq!(renamed.display_name, "Aadhaar card");
        assert_eq!(renamed.stored_key, doc.stored_key);

        let swapped = h
            .svc
            .replace(&doc.id, Some("  "), Some(UploadFile::new("new.png", "image/png", vec![7u8; 16])))
            .unwrap();
        assert_eq!(swapped.display_name, "Aadhaar card");
        assert_eq!(swapped.content_type, "image/png");
        assert_eq!(swapped.size, 16);
        assert!(!h.blobs.exists(&doc.stored_key).unwrap());
        assert_eq!(h.svc.read(&doc.id).unwrap().1, vec![7; 16]);

        let bad = h
            .svc
            .replace(&doc.id, None, Some(UploadFile::new("x.gif", "image/gif", vec![1u8])));
        assert!(matches!(bad, Err(DocumentError::UnsupportedType(_))));
        assert_eq!(h.svc.get(&doc.id).unwrap(), swapped);
    }

    #[test]
    fn replace_keeps_listing_order() {
        let h = harness();
        let owner = DocumentOwner::User("u1".into());
        let first = h.svc.upload(owner.clone(), "first", "", pdf("a.pdf")).unwrap();
        h.clock.advance(Duration::seconds(5));
        let second = h.svc.upload(owner.clone(), "second", "", pdf("b.pdf")).unwrap();

        h.clock.advance(Duration::seconds(5));
        let replaced = h
            .svc
            .replace(&first.id, None, Some(pdf("a2.pdf")))
            .unwrap();
        assert!(replaced.uploaded_at > second.uploaded_at);

        let ids: Vec<String> = h
            .svc
            .list_for_owner(&owner)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn failed_replace_removes_new_blob() {
        let h = harness();
        let doc = h
            .svc
            .upload(DocumentOwner::Claim("c1".into()), "Bill", "", pdf("bill.pdf"))
            .unwrap();
        assert_eq!(stored_files(&h), 1);

        h.sql
            .exec_batch(
                "CREATE TRIGGER documents_frozen BEFORE UPDATE ON documents
                 BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
            )
            .unwrap();
        assert!(h.svc.replace(&doc.id, None, Some(pdf("bill2.pdf"))).is_err());

        assert_eq!(stored_files(&h), 1);
        assert!(h.blobs.exists(&doc.stored_key).unwrap());
        assert_eq!(h.svc.get(&doc.id).unwrap(), doc);
    }

    #[test]
    fn delete_removes_record_and_blob() {
        let h = harness();
        let doc = h
            .svc
            .upload(DocumentOwner::Claim("c1".into()), "Bill", "", pdf("bill.pdf"))
            .unwrap();
        h.svc.delete(&doc.id).unwrap();

        assert!(!h.blobs.exists(&doc.stored_key).unwrap());
        assert!(matches!(h.svc.get(&doc.id), Err(DocumentError::NotFound(_))));
        assert!(matches!(h.svc.delete(&doc.id), Err(DocumentError::NotFound(_))));
    }
}
