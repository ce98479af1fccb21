//! Process-local link repository.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::json;

use crate::domain::entities::{
    LinkFilter, LinkPatch, LinkRecord, NewLinkRecord, Page, PageRequest, SortBy, SortDirection,
    SortField,
};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, UniqueField};

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, LinkRecord>,
    by_code: HashMap<String, i64>,
    by_alias: HashMap<String, i64>,
    by_long_url: HashMap<String, i64>,
    inserts: u64,
}

impl Inner {
    fn get_by(&self, index: &HashMap<String, i64>, key: &str) -> Option<LinkRecord> {
        index.get(key).and_then(|id| self.records.get(id)).cloned()
    }

    /// Codes and aliases share one namespace.
    fn is_identifier_taken(&self, value: &str) -> bool {
        self.by_code.contains_key(value) || self.by_alias.contains_key(value)
    }

    fn identifier_holder(&self, value: &str) -> Option<i64> {
        self.by_code
            .get(value)
            .or_else(|| self.by_alias.get(value))
            .copied()
    }
}

/// In-memory repository with the same uniqueness guarantees as the PostgreSQL one.
///
/// All three unique indexes are checked and updated under one write lock, so
/// inserts are atomic with respect to each other. Short codes and aliases are
/// checked against each other as well as against themselves. Used by tests and by
/// `STORAGE=memory` deployments; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    inner: RwLock<Inner>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful inserts since construction.
    pub fn insert_count(&self) -> u64 {
        self.inner.read().inserts
    }

    /// Fetches a record by id without touching its visit count.
    pub fn get(&self, id: i64) -> Option<LinkRecord> {
        self.inner.read().records.get(&id).cloned()
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Short link not found", json!({ "id": id }))
}

fn matches_filter(link: &LinkRecord, filter: &LinkFilter) -> bool {
    filter
        .owner
        .as_ref()
        .is_none_or(|owner| link.owner.as_ref() == Some(owner))
        && filter.is_active.is_none_or(|active| link.is_active == active)
        && filter
            .tag
            .as_ref()
            .is_none_or(|tag| link.tags.contains(tag))
}

fn compare_field(a: &LinkRecord, b: &LinkRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::VisitCount => a.visit_count.cmp(&b.visit_count),
        SortField::LongUrl => a.long_url.cmp(&b.long_url),
        SortField::ShortCode => a.short_code.cmp(&b.short_code),
        SortField::ExpirationDate => a.expiration_date.cmp(&b.expiration_date),
    }
}

fn compare(a: &LinkRecord, b: &LinkRecord, sort_by: &[SortBy]) -> Ordering {
    let default = [SortBy {
        field: SortField::CreatedAt,
        direction: SortDirection::Asc,
    }];
    let criteria = if sort_by.is_empty() { &default[..] } else { sort_by };

    criteria
        .iter()
        .map(|s| {
            let ord = compare_field(a, b, s.field);
            match s.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, new_link: NewLinkRecord) -> Result<LinkRecord, AppError> {
        let mut inner = self.inner.write();

        if let Some(alias) = &new_link.custom_alias
            && inner.is_identifier_taken(alias)
        {
            return Err(AppError::Duplicate {
                field: UniqueField::CustomAlias,
            });
        }
        if inner.is_identifier_taken(&new_link.short_code)
            || new_link.custom_alias.as_ref() == Some(&new_link.short_code)
        {
            return Err(AppError::Duplicate {
                field: UniqueField::ShortCode,
            });
        }
        if inner.by_long_url.contains_key(&new_link.long_url) {
            return Err(AppError::Duplicate {
                field: UniqueField::LongUrl,
            });
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let link = LinkRecord::from_new(id, new_link, Utc::now());

        inner.by_code.insert(link.short_code.clone(), id);
        if let Some(alias) = &link.custom_alias {
            inner.by_alias.insert(alias.clone(), id);
        }
        inner.by_long_url.insert(link.long_url.clone(), id);
        inner.records.insert(id, link.clone());
        inner.inserts += 1;

        Ok(link)
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<LinkRecord>, AppError> {
        let inner = self.inner.read();
        Ok(inner.get_by(&inner.by_long_url, long_url))
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<LinkRecord>, AppError> {
        let inner = self.inner.read();
        Ok(inner.get_by(&inner.by_alias, alias))
    }

    async fn find_by_short_code_or_alias(
        &self,
        value: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        let inner = self.inner.read();
        Ok(inner
            .get_by(&inner.by_code, value)
            .or_else(|| inner.get_by(&inner.by_alias, value)))
    }

    async fn exists_by_short_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.read().by_code.contains_key(code))
    }

    async fn record_visit(&self, id: i64) -> Result<LinkRecord, AppError> {
        let mut inner = self.inner.write();
        let link = inner.records.get_mut(&id).ok_or_else(|| not_found(id))?;

        link.visit_count += 1;
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<LinkRecord, AppError> {
        let mut inner = self.inner.write();

        let current_alias = inner
            .records
            .get(&id)
            .ok_or_else(|| not_found(id))?
            .custom_alias
            .clone();

        if let Some(Some(alias)) = &patch.custom_alias
            && inner
                .identifier_holder(alias)
                .is_some_and(|holder| holder != id)
        {
            return Err(AppError::Duplicate {
                field: UniqueField::CustomAlias,
            });
        }

        if let Some(new_alias) = &patch.custom_alias {
            if let Some(old) = &current_alias {
                inner.by_alias.remove(old);
            }
            if let Some(alias) = new_alias {
                inner.by_alias.insert(alias.clone(), id);
            }
        }

        let link = inner.records.get_mut(&id).ok_or_else(|| not_found(id))?;
        patch.apply_to(link);
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn paginate(
        &self,
        filter: LinkFilter,
        request: PageRequest,
    ) -> Result<Page<LinkRecord>, AppError> {
        let inner = self.inner.read();

        let mut matching: Vec<&LinkRecord> = inner
            .records
            .values()
            .filter(|link| matches_filter(link, &filter))
            .collect();
        matching.sort_by(|a, b| compare(a, b, &request.sort_by));

        let total = matching.len() as i64;
        let results = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(0))
            .cloned()
            .collect();

        Ok(Page::new(results, &request, total))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
