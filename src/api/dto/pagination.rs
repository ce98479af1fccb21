//! Listing query parameters.

use serde::Deserialize;
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::{LinkFilter, PageRequest, parse_sort_by};
use crate::error::AppError;

/// Query parameters for `GET /url/all`.
///
/// Uses `serde_with` to parse numbers and booleans from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub owner: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default, alias = "isActive")]
    pub is_active: Option<bool>,

    pub tag: Option<String>,

    /// Comma-separated `field:asc|desc` pairs.
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,
}

impl ListQuery {
    /// Splits the query into a store filter and a page request.
    ///
    /// Missing `limit` and `page` take the defaults; out-of-range values are
    /// clamped later by the service.
    pub fn into_parts(self) -> Result<(LinkFilter, PageRequest), AppError> {
        let defaults = PageRequest::default();

        let sort_by = match self.sort_by.as_deref() {
            Some(spec) => parse_sort_by(spec)
                .map_err(|e| AppError::bad_request(e, json!({ "sort_by": spec })))?,
            None => Vec::new(),
        };

        let filter = LinkFilter {
            owner: self.owner,
            is_active: self.is_active,
            tag: self.tag,
        };

        let request = PageRequest {
            sort_by,
            limit: self.limit.unwrap_or(defaults.limit),
            page: self.page.unwrap_or(defaults.page),
        };

        Ok((filter, request))
    }
}
