//! Domain layer containing business entities and storage contracts.
//!
//! - [`entities`] - Link records, patches, resolution results and paging types
//! - [`repositories`] - Storage trait implemented by the infrastructure layer
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Business logic lives in [`crate::application::services`].

pub mod entities;
pub mod repositories;
