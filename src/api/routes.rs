//! API route configuration.

use crate::api::handlers::{
    create_link_handler, list_links_handler, redirect_handler, stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Link routes.
///
/// # Endpoints
///
/// - `POST  /url`               - Create a short link
/// - `GET   /url?short_url=`    - Redirect to the long URL
/// - `GET   /url/stats?short_url=` - Resolve and return stats
/// - `GET   /url/all`           - List links (paginated)
/// - `PATCH /url/{code}`        - Partially update a link
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/url", get(redirect_handler).post(create_link_handler))
        .route("/url/stats", get(stats_handler))
        .route("/url/all", get(list_links_handler))
        .route("/url/{code}", patch(update_link_handler))
}
