//! Target URL validation.
//!
//! URLs are checked but stored exactly as submitted (after trimming
//! surrounding whitespace), so a redirect returns the same string the client
//! sent.

use url::Url;

/// Longest accepted target URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Empty,

    #[error("URL must be at most {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Validates a target URL and returns its trimmed form.
///
/// # Rules
///
/// 1. Not empty after trimming, at most [`MAX_URL_LENGTH`] bytes
/// 2. No whitespace or control characters inside it
/// 3. Parses as an absolute URL
/// 4. Scheme is `http` or `https`
/// 5. Has a non-empty host
///
/// Rejects dangerous schemes like `javascript:`, `data:` and `file:`.
pub fn validate_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    // The parser silently drops interior tabs and newlines; the stored string
    // must stay usable as a `Location` header.
    if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(UrlValidationError::InvalidFormat(
            "URL must not contain whitespace or control characters".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(trimmed.to_string())
}
