//! Repository trait for link record storage.

use crate::domain::entities::{LinkFilter, LinkPatch, LinkRecord, NewLinkRecord, Page, PageRequest};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage contract consumed by the link service.
///
/// Implementations are the source of truth for uniqueness: `short_code`,
/// `custom_alias` (when set) and `long_url` must be enforced as hard
/// constraints at insert time, because the service only pre-checks them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - Process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new record atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Duplicate`] naming the violated unique field if the
    /// short code, custom alias or long URL already exists.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLinkRecord) -> Result<LinkRecord, AppError>;

    /// Finds a record by exact long URL.
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Finds a record by custom alias.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Finds a record whose short code or custom alias equals `value`.
    ///
    /// A short code match takes precedence over an alias match.
    async fn find_by_short_code_or_alias(
        &self,
        value: &str,
    ) -> Result<Option<LinkRecord>, AppError>;

    /// Returns true if a record with this short code exists.
    async fn exists_by_short_code(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically increments the visit count and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the record no longer exists.
    /// Returns [`AppError::WriteConflict`] if the store aborted the write; the
    /// caller retries.
    async fn record_visit(&self, id: i64) -> Result<LinkRecord, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this id.
    /// Returns [`AppError::Duplicate`] if the new alias is taken.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<LinkRecord, AppError>;

    /// Lists records matching `filter`, sorted and paginated per `request`.
    async fn paginate(
        &self,
        filter: LinkFilter,
        request: PageRequest,
    ) -> Result<Page<LinkRecord>, AppError>;

    /// Returns true if the backing store is reachable.
    async fn health_check(&self) -> bool;
}
