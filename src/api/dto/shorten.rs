//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The original URL to shorten. Format is checked by the allocator.
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,

    /// Optional custom short code.
    #[serde(default, alias = "custom_code")]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Custom code must be between 1 and 255 characters"
    ))]
    pub custom_code: Option<String>,
}

/// Response envelope for the shorten endpoint.
///
/// Exactly one of `data` and `error` is present, matching `success`.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ShortenData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Request field the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Payload of a successful shorten call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenData {
    pub short_url: String,
    pub short_code: String,
}

impl ShortenResponse {
    pub fn success(short_url: String, short_code: String) -> Self {
        Self {
            success: true,
            data: Some(ShortenData {
                short_url,
                short_code,
            }),
            error: None,
            field: None,
        }
    }

    pub fn failure(err: &AppError) -> Self {
        let info = err.to_error_info();
        let field = info
            .details
            .get("field")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Self {
            success: false,
            data: None,
            error: Some(info.message),
            field,
        }
    }
}
