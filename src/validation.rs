// Validation utilities module
// Custom validators used by request DTOs

use std::sync::OnceLock;

use regex::Regex;
use validator::ValidationError;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("username pattern is valid"))
}

/// Usernames are restricted to ASCII letters, digits, `_`, `.` and `-`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_pattern().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username_characters"))
    }
}

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}
