//! Link creation, resolution and management service.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::application::services::uniqueness::{DEFAULT_MAX_ATTEMPTS, UniquenessResolver};
use crate::domain::entities::{
    LinkFilter, LinkPatch, LinkRecord, NewLinkRecord, Page, PageRequest, Resolution,
};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, UniqueField};
use crate::utils::code_generator::{CodeGenerator, fingerprint};

/// Default number of retries for a visit increment that hit a write conflict.
pub const DEFAULT_VISIT_RETRY_ATTEMPTS: usize = 3;

/// How resolution treats a record whose expiration date has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// Expired records still resolve; the date is reported in the stats only.
    #[default]
    Informational,
    /// Expired records fail with [`AppError::Expired`] and are not counted.
    Enforce,
}

impl FromStr for ExpirationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "informational" => Ok(Self::Informational),
            "enforce" => Ok(Self::Enforce),
            other => Err(format!(
                "expiration policy must be 'informational' or 'enforce', got '{other}'"
            )),
        }
    }
}

/// Service for creating and resolving short links.
///
/// Creation is idempotent per long URL. Code uniqueness relies on the
/// store's constraints; the [`UniquenessResolver`] pre-check only reduces how
/// often an insert loses a race. Resolution is a read-then-write command:
/// every successful call writes one visit increment.
pub struct LinkService<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    resolver: UniquenessResolver<L>,
    expiration_policy: ExpirationPolicy,
    visit_retry_attempts: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a link service with default limits.
    pub fn new(repository: Arc<L>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            resolver: UniquenessResolver::new(repository.clone(), generator, DEFAULT_MAX_ATTEMPTS),
            repository,
            expiration_policy: ExpirationPolicy::default(),
            visit_retry_attempts: DEFAULT_VISIT_RETRY_ATTEMPTS,
        }
    }

    /// Creates a link service with explicit limits and policy.
    pub fn with_options(
        repository: Arc<L>,
        generator: Arc<dyn CodeGenerator>,
        max_attempts: usize,
        expiration_policy: ExpirationPolicy,
        visit_retry_attempts: usize,
    ) -> Self {
        Self {
            resolver: UniquenessResolver::new(repository.clone(), generator, max_attempts),
            repository,
            expiration_policy,
            visit_retry_attempts,
        }
    }

    /// Creates a short link, or returns the existing one for the same long URL.
    ///
    /// # Flow
    ///
    /// 1. A requested alias that already addresses a record fails with
    ///    [`AppError::AliasConflict`]
    /// 2. An existing record with the same long URL is returned unchanged
    /// 3. Otherwise a code is reserved and the record inserted
    /// 4. A duplicate short code reported by the insert counts as a collision
    ///    and draws another code from the same attempt budget
    ///
    /// `long_url` and `custom_alias` are trimmed; an empty alias counts as none.
    ///
    /// # Errors
    ///
    /// - [`AppError::AliasConflict`] if the alias is taken
    /// - [`AppError::GenerationExhausted`] if the attempt cap is reached
    /// - [`AppError::Internal`] on store errors
    pub async fn create(
        &self,
        long_url: String,
        custom_alias: Option<String>,
    ) -> Result<LinkRecord, AppError> {
        let long_url = long_url.trim().to_string();
        let custom_alias = custom_alias
            .map(|alias| alias.trim().to_string())
            .filter(|alias| !alias.is_empty());

        if let Some(alias) = &custom_alias
            && self
                .repository
                .find_by_short_code_or_alias(alias)
                .await?
                .is_some()
        {
            return Err(AppError::alias_conflict(alias.clone()));
        }

        if let Some(existing) = self.repository.find_by_long_url(&long_url).await? {
            counter!("links_deduplicated_total").increment(1);
            debug!(code = %existing.short_code, "Returning existing link for long URL");
            return Ok(existing);
        }

        let fingerprint = fingerprint(&long_url)?;
        let mut budget = self.resolver.budget();

        loop {
            let short_code = self.resolver.reserve(&mut budget).await?;

            let new_link = NewLinkRecord {
                long_url: long_url.clone(),
                short_code: short_code.clone(),
                custom_alias: custom_alias.clone(),
                owner: None,
                expiration_date: None,
                is_active: false,
                tags: Vec::new(),
                salt: fingerprint.salt.clone(),
                fingerprint: fingerprint.digest.clone(),
            };

            match self.repository.insert(new_link).await {
                Ok(link) => {
                    counter!("links_created_total").increment(1);
                    info!(
                        code = %link.short_code,
                        alias = ?link.custom_alias,
                        attempts = budget.used(),
                        "Short link created"
                    );
                    return Ok(link);
                }
                Err(AppError::Duplicate {
                    field: UniqueField::ShortCode,
                }) => {
                    counter!("short_code_collisions_total").increment(1);
                    warn!(
                        code = %short_code,
                        attempt = budget.used(),
                        "Lost short code race at insert, retrying"
                    );
                }
                Err(AppError::Duplicate {
                    field: UniqueField::CustomAlias,
                }) => {
                    let alias = custom_alias.clone().unwrap_or_default();
                    return Err(AppError::alias_conflict(alias));
                }
                Err(AppError::Duplicate {
                    field: UniqueField::LongUrl,
                }) => {
                    counter!("links_deduplicated_total").increment(1);
                    debug!("Concurrent creation of the same long URL, returning winner");
                    return self
                        .repository
                        .find_by_long_url(&long_url)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal(
                                "Link reported as duplicate but not found",
                                json!({ "long_url": long_url }),
                            )
                        });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolves a short code or custom alias and records one visit.
    ///
    /// The returned stats reflect the record after the increment.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if nothing matches
    /// - [`AppError::Expired`] if the record is expired and the policy is
    ///   [`ExpirationPolicy::Enforce`]
    /// - [`AppError::WriteConflict`] if the increment kept conflicting after retries
    pub async fn resolve(&self, code_or_alias: &str) -> Result<Resolution, AppError> {
        let value = code_or_alias.trim();

        let link = self
            .repository
            .find_by_short_code_or_alias(value)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_url": value }))
            })?;

        if link.is_expired() {
            match self.expiration_policy {
                ExpirationPolicy::Enforce => {
                    debug!(code = %link.short_code, "Refusing to resolve expired link");
                    return Err(AppError::Expired {
                        code: link.short_code,
                    });
                }
                ExpirationPolicy::Informational => {
                    debug!(code = %link.short_code, "Resolving expired link");
                }
            }
        }

        let updated = self.record_visit(link.id).await?;
        counter!("links_resolved_total").increment(1);

        Ok(Resolution::from(updated))
    }

    /// Applies a management edit to the record addressed by `code_or_alias`.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if nothing matches
    /// - [`AppError::AliasConflict`] if the new alias addresses another record
    pub async fn update(&self, code_or_alias: &str, patch: LinkPatch) -> Result<LinkRecord, AppError> {
        let value = code_or_alias.trim();

        let link = self
            .repository
            .find_by_short_code_or_alias(value)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_url": value }))
            })?;

        let mut patch = patch;
        let requested_alias = match &patch.custom_alias {
            Some(Some(alias)) => Some(alias.trim().to_string()),
            _ => None,
        };

        if let Some(alias) = requested_alias {
            if alias.is_empty() {
                patch.custom_alias = Some(None);
            } else {
                if let Some(holder) = self.repository.find_by_short_code_or_alias(&alias).await?
                    && holder.id != link.id
                {
                    return Err(AppError::alias_conflict(alias));
                }
                patch.custom_alias = Some(Some(alias));
            }
        }

        if patch.is_empty() {
            return Ok(link);
        }

        match self.repository.update(link.id, patch.clone()).await {
            Err(AppError::Duplicate {
                field: UniqueField::CustomAlias,
            }) => Err(AppError::alias_conflict(
                patch.custom_alias.flatten().unwrap_or_default(),
            )),
            other => other,
        }
    }

    /// Lists records through the store's pagination.
    pub async fn list(
        &self,
        filter: LinkFilter,
        request: PageRequest,
    ) -> Result<Page<LinkRecord>, AppError> {
        self.repository.paginate(filter, request.normalized()).await
    }

    /// Returns true if the backing store is reachable.
    pub async fn is_store_healthy(&self) -> bool {
        self.repository.health_check().await
    }

    /// Increments the visit count, retrying store write conflicts.
    async fn record_visit(&self, id: i64) -> Result<LinkRecord, AppError> {
        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(250))
            .map(jitter)
            .take(self.visit_retry_attempts);

        RetryIf::start(
            strategy,
            || self.repository.record_visit(id),
            |e: &AppError| {
                let retry = e.is_retryable();
                if retry {
                    warn!(id, "Visit increment conflicted, retrying");
                }
                retry
            },
        )
        .await
    }
}

/// Builds the public short URL for a code.
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}
