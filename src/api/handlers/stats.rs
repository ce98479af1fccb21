//! Handler for link statistics.

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use crate::api::dto::link::{LinkResponse, ResolveQuery};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a code and returns the target with its stats snapshot.
///
/// # Endpoint
///
/// `GET /url/stats?short_url={code}`
///
/// This is a resolution: the visit count is incremented and the response
/// reports the count after the increment.
///
/// # Response
///
/// ```json
/// {
///   "long_url": "https://example.com/a",
///   "short_url": "http://localhost:3000/Ab3xY9",
///   "short_code": "Ab3xY9",
///   "expiration_date": null,
///   "is_active": false,
///   "custom_alias": null,
///   "tags": [],
///   "visit_count": 1
/// }
/// ```
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<LinkResponse>, AppError> {
    query.validate()?;

    let resolution = state.link_service.resolve(&query.short_url).await?;

    Ok(Json(LinkResponse::from_resolution(
        resolution,
        &state.base_url,
    )))
}
