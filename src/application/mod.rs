//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls
//! and business rules. Services consume repository traits and provide a clean
//! API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Creation, resolution, listing and edits
//! - [`services::uniqueness::UniquenessResolver`] - Collision-checked code reservation

pub mod services;
