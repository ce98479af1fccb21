//! DTOs for link creation and resolution endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::short_url;
use crate::domain::entities::{LinkRecord, LinkStats, Resolution};
use crate::utils::url_validator::{ALIAS_REGEX, LONG_URL_REGEX};

/// Request body for `POST /url`.
///
/// Accepts both `long_url` and `longUrl` style keys.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL to shorten (must be HTTP/HTTPS).
    #[serde(alias = "longUrl")]
    #[validate(regex(path = "*LONG_URL_REGEX", message = "Invalid URL format"))]
    pub long_url: String,

    /// Optional caller-chosen alias.
    #[serde(default, alias = "customAlias")]
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(
        path = "*ALIAS_REGEX",
        message = "Custom alias can only contain letters, digits, underscores and hyphens"
    ))]
    pub custom_alias: Option<String>,
}

impl CreateLinkRequest {
    /// Trims both fields and drops an empty alias.
    pub fn normalized(self) -> Self {
        Self {
            long_url: self.long_url.trim().to_string(),
            custom_alias: self
                .custom_alias
                .map(|alias| alias.trim().to_string())
                .filter(|alias| !alias.is_empty()),
        }
    }
}

/// Query string for `GET /url` and `GET /url/stats`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveQuery {
    /// Short code or custom alias, without the base URL.
    #[serde(alias = "shortUrl")]
    #[validate(length(min = 1, message = "short_url must not be empty"))]
    pub short_url: String,
}

/// Serialized link.
///
/// `short_url` is the configured base URL joined with the short code. The
/// stats block and timestamps are present only where the endpoint asks for them.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub long_url: String,
    pub short_url: String,
    pub short_code: String,

    #[serde(flatten)]
    pub stats: Option<LinkStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LinkResponse {
    /// Long and short URL only.
    pub fn from_record(link: &LinkRecord, base_url: &str) -> Self {
        Self {
            long_url: link.long_url.clone(),
            short_url: short_url(base_url, &link.short_code),
            short_code: link.short_code.clone(),
            stats: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Full view with stats and timestamps, used by listing and management.
    pub fn detailed(link: &LinkRecord, base_url: &str) -> Self {
        Self {
            stats: Some(link.stats()),
            created_at: Some(link.created_at),
            updated_at: Some(link.updated_at),
            ..Self::from_record(link, base_url)
        }
    }

    /// Resolution result with the post-increment stats snapshot.
    pub fn from_resolution(resolution: Resolution, base_url: &str) -> Self {
        Self {
            short_url: short_url(base_url, &resolution.short_code),
            long_url: resolution.long_url,
            short_code: resolution.short_code,
            stats: Some(resolution.stats),
            created_at: None,
            updated_at: None,
        }
    }
}
