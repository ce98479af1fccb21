//! Link record entity and its derived views.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted short link.
///
/// `short_code` and `custom_alias` are globally unique; either one addresses
/// the record. `salt` and `fingerprint` are audit data and never take part in
/// comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub owner: Option<String>,
    pub visit_count: i64,
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub salt: String,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Builds a freshly inserted record from its creation input.
    pub fn from_new(id: i64, new_link: NewLinkRecord, now: DateTime<Utc>) -> Self {
        Self {
            id,
            long_url: new_link.long_url,
            short_code: new_link.short_code,
            custom_alias: new_link.custom_alias,
            owner: new_link.owner,
            visit_count: 0,
            expiration_date: new_link.expiration_date,
            is_active: new_link.is_active,
            tags: new_link.tags,
            salt: new_link.salt,
            fingerprint: new_link.fingerprint,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the expiration date is set and lies in the past.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|e| e < now)
    }

    /// Snapshot of the fields reported on resolution.
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            expiration_date: self.expiration_date,
            is_active: self.is_active,
            custom_alias: self.custom_alias.clone(),
            tags: self.tags.clone(),
            visit_count: self.visit_count,
        }
    }
}

/// Input data for inserting a new link record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLinkRecord {
    pub long_url: String,
    pub short_code: String,
    pub custom_alias: Option<String>,
    pub owner: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub salt: String,
    pub fingerprint: String,
}

/// Partial update applied by management operations.
///
/// `None` fields are left unchanged. For the double options, `Some(None)`
/// clears the value and `Some(Some(v))` sets it. Visit count, short code and
/// long URL are not editable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub custom_alias: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub expiration_date: Option<Option<DateTime<Utc>>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.custom_alias.is_none()
            && self.is_active.is_none()
            && self.tags.is_none()
            && self.expiration_date.is_none()
    }

    /// Applies the patch to an in-memory record.
    pub fn apply_to(&self, link: &mut LinkRecord) {
        if let Some(alias) = &self.custom_alias {
            link.custom_alias = alias.clone();
        }
        if let Some(is_active) = self.is_active {
            link.is_active = is_active;
        }
        if let Some(tags) = &self.tags {
            link.tags = tags.clone();
        }
        if let Some(expiration_date) = self.expiration_date {
            link.expiration_date = expiration_date;
        }
    }
}

/// Statistics returned alongside a resolved URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStats {
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub custom_alias: Option<String>,
    pub tags: Vec<String>,
    pub visit_count: i64,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub long_url: String,
    pub short_code: String,
    pub stats: LinkStats,
}

impl From<LinkRecord> for Resolution {
    fn from(link: LinkRecord) -> Self {
        let stats = link.stats();
        Self {
            long_url: link.long_url,
            short_code: link.short_code,
            stats,
        }
    }
}
