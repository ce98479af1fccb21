//! Business logic services for the application layer.

pub mod link_service;
pub mod uniqueness;

pub use link_service::{ExpirationPolicy, LinkService, short_url};
pub use uniqueness::{AttemptBudget, UniquenessResolver};
