//! Handler for short URL redirect.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use validator::Validate;

use crate::api::dto::link::ResolveQuery;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code or custom alias to its original URL.
///
/// # Endpoint
///
/// `GET /url?short_url={code}`
///
/// # Request Flow
///
/// 1. Resolve the code or alias through the link service
/// 2. The visit count is incremented before the response is sent
/// 3. Return 307 Temporary Redirect
///
/// # Errors
///
/// - 400 Bad Request if `short_url` is missing or empty
/// - 404 Not Found if nothing matches
/// - 410 Gone if the link expired and expiration is enforced
pub async fn redirect_handler(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let resolution = state.link_service.resolve(&query.short_url).await?;

    Ok(Redirect::temporary(&resolution.long_url))
}
