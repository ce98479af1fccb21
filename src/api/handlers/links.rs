//! Handlers for link management endpoints (create, list, update).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkResponse};
use crate::api::dto::pagination::ListQuery;
use crate::api::dto::update_link::UpdateLinkRequest;
use crate::domain::entities::Page;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link, or returns the existing one for the same long URL.
///
/// # Endpoint
///
/// `POST /url`
///
/// # Request Body
///
/// ```json
/// {
///   "long_url": "https://example.com/some/page",
///   "custom_alias": "promo"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the URL or alias is malformed
/// - 409 Conflict if the alias is taken
/// - 503 Service Unavailable if no free code was found within the attempt cap
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let payload = payload.normalized();
    payload.validate()?;

    let link = state
        .link_service
        .create(payload.long_url, payload.custom_alias)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::detailed(&link, &state.base_url)),
    ))
}

/// Lists stored links.
///
/// # Endpoint
///
/// `GET /url/all?owner=&is_active=&tag=&sort_by=visit_count:desc&limit=10&page=1`
///
/// # Response
///
/// `{ "results": [...], "page": 1, "limit": 10, "total_pages": 1, "total_results": 3 }`
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<LinkResponse>>, AppError> {
    let (filter, request) = query.into_parts()?;

    let page = state.link_service.list(filter, request).await?;
    let base_url = state.base_url.as_str();

    Ok(Json(page.map(|link| LinkResponse::detailed(&link, base_url))))
}

/// Partially updates a link addressed by short code or alias.
///
/// # Endpoint
///
/// `PATCH /url/{code}`
///
/// # Errors
///
/// - 400 Bad Request if the new alias is malformed
/// - 404 Not Found if nothing matches
/// - 409 Conflict if the new alias belongs to another link
pub async fn update_link_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let patch = payload.into_patch()?;

    let link = state.link_service.update(&code, patch).await?;

    Ok(Json(LinkResponse::detailed(&link, &state.base_url)))
}
