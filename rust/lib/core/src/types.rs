/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Trim an optional string, treating `None` as empty.
///
/// Used wherever a missing field must compare equal to an empty one and
/// never "null-compares-true".
pub fn trimmed(value: Option<&str>) -> &str {
    value.map(str::trim).unwrap_or("")
}
