//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use validator::ValidateUrl;

use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, customer
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, barcode, NIC, status labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Username and password length policy (inclusive)
pub const CREDENTIAL_MIN_LEN: usize = 8;
pub const CREDENTIAL_MAX_LEN: usize = 10;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Trim an optional string, mapping blank to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Username/password length policy, counted in characters.
pub fn validate_credential_len(value: &str, field: &str) -> Result<(), AppError> {
    let len = value.chars().count();
    if !(CREDENTIAL_MIN_LEN..=CREDENTIAL_MAX_LEN).contains(&len) {
        return Err(AppError::with_message(
            ErrorCode::PasswordPolicy,
            format!("{field} must be {CREDENTIAL_MIN_LEN}-{CREDENTIAL_MAX_LEN} characters"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

/// Normalize an optional image URL: blank → `None`, otherwise it must be an
/// absolute http(s) URL.
pub fn normalize_image_url(value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(url) = non_blank(value) else {
        return Ok(None);
    };
    if url.len() > MAX_URL_LEN {
        return Err(AppError::validation("imageUrl is too long").with_detail("field", "imageUrl"));
    }
    let is_http = url.starts_with("http://") || url.starts_with("https://");
    if !is_http || !url.validate_url() {
        return Err(AppError::validation("imageUrl must be a valid URL")
            .with_detail("field", "imageUrl"));
    }
    Ok(Some(url))
}

/// Price must be a finite, non-negative number.
pub fn validate_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a finite number >= 0"
        ))
        .with_detail("field", field));
    }
    Ok(())
}
