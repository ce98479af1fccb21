//! Translation of SQLx errors into [`AppError`].

use serde_json::json;

use crate::error::{AppError, UniqueField};

/// Unique constraint names created by `migrations/`.
const SHORT_CODE_CONSTRAINT: &str = "links_short_code_key";
const CUSTOM_ALIAS_CONSTRAINT: &str = "links_custom_alias_key";
const LONG_URL_CONSTRAINT: &str = "links_long_url_key";

/// SQLSTATE codes for serialization failures and deadlocks.
const RETRYABLE_SQLSTATES: &[&str] = &["40001", "40P01"];

/// Maps a unique constraint name onto the column it guards.
pub fn unique_field(constraint: Option<&str>) -> Option<UniqueField> {
    match constraint? {
        SHORT_CODE_CONSTRAINT => Some(UniqueField::ShortCode),
        CUSTOM_ALIAS_CONSTRAINT => Some(UniqueField::CustomAlias),
        LONG_URL_CONSTRAINT => Some(UniqueField::LongUrl),
        _ => None,
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(field) = unique_field(db_err.constraint()) {
                return AppError::Duplicate { field };
            }

            return AppError::internal(
                "Unique constraint violation",
                json!({ "constraint": db_err.constraint() }),
            );
        }

        if db_err
            .code()
            .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref()))
        {
            return AppError::WriteConflict;
        }
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal("Database error", json!({}))
}
