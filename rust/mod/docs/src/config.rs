use crate::service::DocumentError;

/// 2 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 2 * 1024 * 1024;

pub const DEFAULT_ALLOWED_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Upload limits.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Largest accepted payload in bytes.
    pub max_bytes: u64,
    /// Accepted content types, lower-case.
    pub allowed_types: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl DocumentConfig {
    /// Reject an empty payload, then an undeclared or disallowed type, then
    /// anything over `max_bytes`. Returns the normalized content type.
    pub fn validate(&self, content_type: Option<&str>, size: u64) -> Result<String, DocumentError> {
        if size == 0 {
            return Err(DocumentError::EmptyFile);
        }
        let normalized = content_type.unwrap_or("").trim().to_ascii_lowercase();
        if !self.allowed_types.iter().any(|t| *t == normalized) {
            return Err(DocumentError::UnsupportedType(normalized));
        }
        if size > self.max_bytes {
            return Err(DocumentError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(normalized)
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`. A missing or
/// blank name becomes `file`.
pub fn sanitize_filename(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
        _ => "file".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_normalized() {
        let cfg = DocumentConfig::default();
        assert_eq!(cfg.validate(Some(" Application/PDF "), 10).unwrap(), "application/pdf");
        assert_eq!(cfg.validate(Some("image/jpg"), 10).unwrap(), "image/jpg");
        assert!(matches!(
            cfg.validate(Some("text/plain"), 10),
            Err(DocumentError::UnsupportedType(t)) if t == "text/plain"
        ));
        assert!(matches!(cfg.validate(None, 10), Err(DocumentError::UnsupportedType(_))));
    }

    #[test]
    fn size_limits() {
        let cfg = DocumentConfig::default();
        assert!(matches!(cfg.validate(Some("image/png"), 0), Err(DocumentError::EmptyFile)));
        assert!(matches!(cfg.validate(Some("text/plain"), 0), Err(DocumentError::EmptyFile)));
        assert!(cfg.validate(Some("image/png"), DEFAULT_MAX_BYTES).is_ok());
        assert!(matches!(
            cfg.validate(Some("image/png"), DEFAULT_MAX_BYTES + 1),
            Err(DocumentError::TooLarge { .. })
        ));
    }

    #[test]
    fn filenames() {
        assert_eq!(sanitize_filename(Some("my scan (1).pdf")), "my_scan__1_.pdf");
        assert_eq!(sanitize_filename(Some("../../etc/passwd")), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(Some("ok-name_1.PNG")), "ok-name_1.PNG");
        assert_eq!(sanitize_filename(Some("  ")), "file");
        assert_eq!(sanitize_filename(None), "file");
        assert_eq!(sanitize_filename(Some("résumé.pdf")), "r_sum_.pdf");
    }
}
