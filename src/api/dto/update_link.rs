//! DTO for the link update endpoint.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::domain::entities::LinkPatch;
use crate::error::AppError;
use crate::utils::url_validator::validate_alias;

/// Request body for `PATCH /url/{code}`.
///
/// All fields are optional; only provided fields are changed.
///
/// # `custom_alias` and `expiration_date` semantics
///
/// - **Absent** → leave existing value unchanged
/// - **`null`** → clear the value
/// - **Value** → set it (an empty alias also clears)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default, alias = "customAlias", with = "::serde_with::rust::double_option")]
    pub custom_alias: Option<Option<String>>,

    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,

    pub tags: Option<Vec<String>>,

    #[serde(default, alias = "expirationDate", with = "::serde_with::rust::double_option")]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateLinkRequest {
    /// Checks the alias shape and converts to a domain patch.
    ///
    /// Tags are trimmed and empty tags dropped.
    pub fn into_patch(self) -> Result<LinkPatch, AppError> {
        if let Some(Some(alias)) = &self.custom_alias
            && !alias.trim().is_empty()
        {
            validate_alias(alias).map_err(|e| {
                AppError::bad_request(e.to_string(), json!({ "custom_alias": alias }))
            })?;
        }

        let tags = self.tags.map(|tags| {
            tags.into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect()
        });

        Ok(LinkPatch {
            custom_alias: self.custom_alias,
            is_active: self.is_active,
            tags,
            expiration_date: self.expiration_date,
        })
    }
}
