//! Application error type and its HTTP representation.
//!
//! Every layer returns [`AppError`]. Store-level variants ([`AppError::Duplicate`],
//! [`AppError::WriteConflict`]) are normally recovered inside the link service
//! and only reach the HTTP boundary when a retry budget runs out.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

/// Unique column reported by the store on an insert or update conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    ShortCode,
    CustomAlias,
    LongUrl,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortCode => "short_code",
            Self::CustomAlias => "custom_alias",
            Self::LongUrl => "long_url",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned under the `error` key.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("Custom alias already exists: {alias}")]
    AliasConflict { alias: String },

    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("Short link has expired: {code}")]
    Expired { code: String },

    #[error("Unique constraint violation on {field}")]
    Duplicate { field: UniqueField },

    #[error("Concurrent write conflict")]
    WriteConflict,

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

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn alias_conflict(alias: impl Into<String>) -> Self {
        Self::AliasConflict {
            alias: alias.into(),
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Returns true for store conditions that should be retried rather than surfaced.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflict)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::AliasConflict { .. } | Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::GenerationExhausted { .. } | Self::WriteConflict => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Expired { .. } => StatusCode::GONE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable form.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::AliasConflict { alias } => ("alias_conflict", json!({ "custom_alias": alias })),
            Self::GenerationExhausted { attempts } => {
                ("generation_exhausted", json!({ "attempts": attempts }))
            }
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::Expired { code } => ("expired", json!({ "short_url": code })),
            Self::Duplicate { field } => ("conflict", json!({ "field": field.as_str() })),
            Self::WriteConflict => ("write_conflict", json!({})),
            Self::Internal { details, .. } => ("internal_error", details.clone()),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        crate::utils::db_error::map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
