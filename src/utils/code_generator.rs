//! Short code generation and validation utilities.
//!
//! Generated and custom codes share one alphabet, `[A-Za-z0-9_-]`, which is
//! exactly the URL-safe base64 alphabet.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Longest accepted short code.
pub const MAX_CODE_LENGTH: usize = 255;

/// Bounds for the configurable length of generated codes.
pub const MIN_GENERATED_LENGTH: usize = 6;
pub const MAX_GENERATED_LENGTH: usize = 12;

/// Default length of generated codes.
pub const DEFAULT_GENERATED_LENGTH: usize = 8;

/// Codes that would shadow service routes.
const RESERVED_CODES: &[&str] = &["api", "health"];

static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("short code pattern is a valid regex")
});

/// Generates a random short code of exactly `length` characters.
///
/// Draws entropy from the OS via `getrandom` and encodes it as URL-safe
/// base64 without padding, truncated to `length`.
///
/// # Errors
///
/// Returns the `getrandom` error if the system RNG is unavailable.
pub fn generate_code(length: usize) -> Result<String, getrandom::Error> {
    // 6 bits per output character
    let mut buffer = vec![0u8; (length * 3).div_ceil(4)];
    getrandom::fill(&mut buffer)?;

    let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    code.truncate(length);
    Ok(code)
}

/// Returns true if `code` is syntactically a short code.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= MAX_CODE_LENGTH && CODE_REGEX.is_match(code)
}

/// Returns true if `code` names a service route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 1-255 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() {
        return Err(AppError::bad_request(
            "Custom code must not be empty",
            json!({ "field": "customCode" }),
        ));
    }

    if code.len() > MAX_CODE_LENGTH {
        return Err(AppError::bad_request(
            format!("Custom code must be at most {MAX_CODE_LENGTH} characters"),
            json!({ "field": "customCode", "provided_length": code.len() }),
        ));
    }

    if !CODE_REGEX.is_match(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, underscores and hyphens",
            json!({ "field": "customCode", "code": code }),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "field": "customCode", "code": code }),
        ));
    }

    Ok(())
}
