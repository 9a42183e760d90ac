//! Field validation rules shared by the request boundary and the CSV
//! pipeline. Each check returns `None` on success or a human-readable
//! message; callers accumulate messages into an error list.

use validator::ValidateEmail;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 120;
pub const OPTIONAL_TEXT_MAX_LEN: usize = 255;
pub const NOTES_MAX_LEN: usize = 5000;

/// Lead name: trimmed length 2..=120.
pub fn check_lead_name(value: &str) -> Option<String> {
    let len = value.trim().chars().count();
    if len < NAME_MIN_LEN || len > NAME_MAX_LEN {
        Some(format!(
            "Name must be between {} and {} characters",
            NAME_MIN_LEN, NAME_MAX_LEN
        ))
    } else {
        None
    }
}

/// Email syntax check (delegates to the validator crate's address rules).
pub fn check_email(value: &str) -> Option<String> {
    if value.trim().validate_email() {
        None
    } else {
        Some("Invalid email address".to_string())
    }
}

/// Optional free-text field: length cap only (blank is fine, it becomes NULL).
pub fn check_optional_text(field: &str, value: Option<&str>, max_len: usize) -> Option<String> {
    match value {
        Some(v) if v.trim().chars().count() > max_len => Some(format!(
            "{} must be at most {} characters",
            field, max_len
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_lead_name() {
        assert!(check_lead_name("Acme").is_none());
        assert!(check_lead_name("A").is_some());
        assert!(check_lead_name("  A  ").is_some());
        assert!(check_lead_name(&"x".repeat(120)).is_none());
        assert!(check_lead_name(&"x".repeat(121)).is_some());
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("acme@x.com").is_none());
        assert!(check_email(" acme@x.com ").is_none());
        assert!(check_email("not-an-email").is_some());
        assert!(check_email("").is_some());
    }

    #[test]
    fn test_check_optional_text() {
        assert!(check_optional_text("Phone", None, 255).is_none());
        assert!(check_optional_text("Phone", Some("+1-202-555-0100"), 255).is_none());
        let too_long = "x".repeat(256);
        let msg = check_optional_text("Phone", Some(&too_long), 255).unwrap();
        assert!(msg.contains("Phone"));
    }
}
