//! Listing filters, sort criteria and page results.

use serde::Serialize;
use std::str::FromStr;

/// Default page size when the caller does not provide one.
pub const DEFAULT_LIMIT: i64 = 10;
/// Upper bound on page size.
pub const MAX_LIMIT: i64 = 100;

/// Sortable link fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    VisitCount,
    LongUrl,
    ShortCode,
    ExpirationDate,
}

impl SortField {
    /// Column name in the `links` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::VisitCount => "visit_count",
            Self::LongUrl => "long_url",
            Self::ShortCode => "short_code",
            Self::ExpirationDate => "expiration_date",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "createdAt" => Ok(Self::CreatedAt),
            "updated_at" | "updatedAt" => Ok(Self::UpdatedAt),
            "visit_count" | "visitCount" => Ok(Self::VisitCount),
            "long_url" | "longUrl" => Ok(Self::LongUrl),
            "short_code" | "shortUrl" | "short_url" => Ok(Self::ShortCode),
            "expiration_date" | "expirationDate" => Ok(Self::ExpirationDate),
            other => Err(format!("Unknown sort field '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One sort criterion, parsed from `field:asc` or `field:desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field, dir),
            None => (s, "asc"),
        };

        let direction = match direction.trim().to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => return Err(format!("Unknown sort direction '{other}'")),
        };

        Ok(Self {
            field: field.trim().parse()?,
            direction,
        })
    }
}

/// Parses a comma-separated sort specification such as `visitCount:desc,createdAt:asc`.
pub fn parse_sort_by(spec: &str) -> Result<Vec<SortBy>, String> {
    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(SortBy::from_str)
        .collect()
}

/// Record filter for listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkFilter {
    pub owner: Option<String>,
    pub is_active: Option<bool>,
    pub tag: Option<String>,
}

/// Page request. `page` is 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub sort_by: Vec<SortBy>,
    pub limit: i64,
    pub page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort_by: Vec::new(),
            limit: DEFAULT_LIMIT,
            page: 1,
        }
    }
}

impl PageRequest {
    /// Clamps `limit` into `1..=MAX_LIMIT` and `page` to at least 1.
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_LIMIT);
        self.page = self.page.max(1);
        self
    }

    /// Rows to skip. Saturates instead of overflowing on huge page numbers.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }
}

/// One page of results with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_results: i64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, request: &PageRequest, total_results: i64) -> Self {
        let total_pages = if total_results == 0 {
            0
        } else {
            (total_results + request.limit - 1) / request.limit
        };

        Self {
            results,
            page: request.page,
            limit: request.limit,
            total_pages,
            total_results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}
