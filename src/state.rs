//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Link service over a type-erased store, plus the public base URL.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub base_url: String,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService<dyn LinkRepository>>, base_url: impl Into<String>) -> Self {
        Self {
            link_service,
            base_url: base_url.into(),
        }
    }
}
