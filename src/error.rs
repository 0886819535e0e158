//! Application error type and its HTTP mapping.
//!
//! Every failure path in the service ends up as an [`AppError`]. Handlers
//! return it directly and axum renders it through [`IntoResponse`], so no
//! request is ever answered by an unhandled panic.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error description included in JSON error bodies.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors produced by the allocator, the resolver and the store.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed URL or short code.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The requested short code is already in use.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Random code generation kept colliding.
    #[error("{message}")]
    Exhausted { message: String, details: Value },

    /// No mapping exists for the short code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The store timed out or the connection failed.
    #[error("{message}")]
    StoreUnavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn exhausted(message: impl Into<String>, details: Value) -> Self {
        Self::Exhausted {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn store_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status used when the error reaches the boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Exhausted { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable error code string used in JSON bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Conflict { .. } => "conflict",
            AppError::Exhausted { .. } => "exhausted",
            AppError::NotFound { .. } => "not_found",
            AppError::StoreUnavailable { .. } => "store_unavailable",
            AppError::Internal { .. } => "internal_error",
        }
    }

    /// Message suitable for showing to an end user.
    ///
    /// Validation and conflict messages are specific; operator-side failures
    /// collapse to a generic text so internals never leak to clients.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::NotFound { message, .. } => message.clone(),
            AppError::StoreUnavailable { .. } => {
                "Service temporarily unavailable, please try again".to_string()
            }
            AppError::Exhausted { .. } | AppError::Internal { .. } => {
                "Failed to create short link".to_string()
            }
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let details = match self {
            AppError::Validation { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::NotFound { details, .. } => details.clone(),
            _ => json!({}),
        };

        ErrorInfo {
            code: self.code(),
            message: self.public_message(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Exhausted { message, details } | AppError::Internal { message, details } => {
                tracing::error!(%message, %details, "request failed");
            }
            AppError::StoreUnavailable { message, details } => {
                tracing::warn!(%message, %details, "store unavailable");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Short code already in use",
                json!({ "constraint": db.constraint() }),
            );
        }

        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => {
                AppError::store_unavailable("Store unavailable", json!({ "reason": e.to_string() }))
            }
            other => AppError::internal("Database error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        let mut fields = serde_json::Map::new();
        for (field, errs) in &field_errors {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(camel_case(field), json!(messages));
        }

        let Some((first_field, first_messages)) = fields.iter().next() else {
            return AppError::bad_request("Validation failed", json!({}));
        };
        let message = first_messages
            .get(0)
            .and_then(Value::as_str)
            .unwrap_or("Validation failed")
            .to_string();
        let field = first_field.clone();

        AppError::bad_request(message, json!({ "field": field, "fields": fields }))
    }
}

/// `custom_code` → `customCode`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
