//! Collision-checked short code reservation.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Default cap on generation attempts per creation.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Counts generation attempts across pre-checks and insert retries.
///
/// One budget is shared by every [`UniquenessResolver::reserve`] call made for
/// a single creation, so collisions found by the pre-check and collisions
/// reported by the store at insert time draw from the same cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudget {
    used: usize,
    max: usize,
}

impl AttemptBudget {
    pub fn new(max: usize) -> Self {
        Self { used: 0, max }
    }

    /// Takes one attempt. Returns false once the cap is reached.
    pub fn try_consume(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}

/// Draws candidates from a [`CodeGenerator`] until one is absent from the store.
///
/// A candidate must be free as a short code and as a custom alias, otherwise
/// resolving the existing alias would start returning the new record.
///
/// The existence check is optimistic. A candidate confirmed absent here can
/// still be taken by a concurrent creator before the insert commits, so the
/// caller must treat a store-reported duplicate as another collision.
pub struct UniquenessResolver<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: usize,
}

impl<L: LinkRepository + ?Sized> UniquenessResolver<L> {
    pub fn new(repository: Arc<L>, generator: Arc<dyn CodeGenerator>, max_attempts: usize) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns a fresh budget sized to this resolver's cap.
    pub fn budget(&self) -> AttemptBudget {
        AttemptBudget::new(self.max_attempts)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Reserves a code that no record uses as its code or alias at check time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::GenerationExhausted`] when `budget` runs out.
    /// Propagates store errors from the existence check.
    pub async fn reserve(&self, budget: &mut AttemptBudget) -> Result<String, AppError> {
        while budget.try_consume() {
            let candidate = self.generator.generate();

            let taken = self.repository.exists_by_short_code(&candidate).await?
                || self.repository.find_by_alias(&candidate).await?.is_some();
            if !taken {
                return Ok(candidate);
            }

            counter!("short_code_collisions_total").increment(1);
            debug!(
                code = %candidate,
                attempt = budget.used(),
                "Short code collision on pre-check"
            );
        }

        error!(
            attempts = budget.max(),
            "Exhausted short code generation attempts"
        );
        Err(AppError::GenerationExhausted {
            attempts: budget.max(),
        })
    }
}
