#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use parking_lot::Mutex;
use shortlink_engine::api::handlers::health_handler;
use shortlink_engine::api::routes::link_routes;
use shortlink_engine::application::services::LinkService;
use shortlink_engine::domain::repositories::LinkRepository;
use shortlink_engine::infrastructure::persistence::InMemoryLinkRepository;
use shortlink_engine::state::AppState;
use shortlink_engine::utils::code_generator::{CodeGenerator, RandomCodeGenerator, generate_code};
use std::collections::VecDeque;
use std::sync::Arc;

pub const BASE_URL: &str = "https://sho.rt/";

/// Yields scripted codes first, then random ones.
pub struct SequenceGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl SequenceGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl CodeGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        self.codes.lock().pop_front().unwrap_or_else(generate_code)
    }
}

/// Always yields the same code.
pub struct FixedGenerator(pub &'static str);

impl CodeGenerator for FixedGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub fn memory_service() -> (Arc<InMemoryLinkRepository>, LinkService<InMemoryLinkRepository>) {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let service = LinkService::new(repo.clone(), Arc::new(RandomCodeGenerator));
    (repo, service)
}

pub fn memory_service_with(
    generator: impl CodeGenerator + 'static,
) -> (Arc<InMemoryLinkRepository>, LinkService<InMemoryLinkRepository>) {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let service = LinkService::new(repo.clone(), Arc::new(generator));
    (repo, service)
}

pub fn create_test_state() -> (AppState, Arc<InMemoryLinkRepository>) {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let store: Arc<dyn LinkRepository> = repo.clone();
    let service = LinkService::new(store, Arc::new(RandomCodeGenerator));

    (AppState::new(Arc::new(service), BASE_URL), repo)
}

/// Link and health routes over a fresh in-memory store.
pub fn test_app() -> (Router, Arc<InMemoryLinkRepository>) {
    let (state, repo) = create_test_state();
    let app = Router::new()
        .merge(link_routes())
        .route("/health", get(health_handler))
        .with_state(state);

    (app, repo)
}
