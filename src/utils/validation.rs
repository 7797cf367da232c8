//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SurrealDB TEXT fields have no built-in length enforcement, so limits
//! are applied at the handler layer.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Person names (first / last)
pub const MAX_NAME_LEN: usize = 100;

/// Phone / contact numbers
pub const MAX_CONTACT_LEN: usize = 50;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an integer falls within an inclusive range.
pub fn validate_range(value: i64, field: &str, min: i64, max: i64) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::validation(format!(
            "{field} must be between {min} and {max} (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Ana", "first_name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("  ", "first_name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(101), "first_name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        assert!(validate_range(1, "table_number", 1, 20).is_ok());
        assert!(validate_range(20, "table_number", 1, 20).is_ok());
        assert!(validate_range(0, "table_number", 1, 20).is_err());
        assert!(validate_range(21, "table_number", 1, 20).is_err());
    }
}
