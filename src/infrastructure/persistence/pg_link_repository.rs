//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{
    LinkFilter, LinkPatch, LinkRecord, NewLinkRecord, Page, PageRequest, SortBy,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const COLUMNS: &str = "id, long_url, short_code, custom_alias, owner, visit_count, \
    expiration_date, is_active, tags, salt, fingerprint, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    long_url: String,
    short_code: String,
    custom_alias: Option<String>,
    owner: Option<String>,
    visit_count: i64,
    expiration_date: Option<DateTime<Utc>>,
    is_active: bool,
    tags: Vec<String>,
    salt: String,
    fingerprint: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for LinkRecord {
    fn from(r: LinkRow) -> Self {
        Self {
            id: r.id,
            long_url: r.long_url,
            short_code: r.short_code,
            custom_alias: r.custom_alias,
            owner: r.owner,
            visit_count: r.visit_count,
            expiration_date: r.expiration_date,
            is_active: r.is_active,
            tags: r.tags,
            salt: r.salt,
            fingerprint: r.fingerprint,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness of `short_code`, `custom_alias` and `long_url` is enforced by
/// the constraints in `migrations/`; violations surface as
/// [`AppError::Duplicate`] through [`crate::utils::db_error::map_sqlx_error`].
/// Codes and aliases are also unique across each other through the
/// `link_identifiers` table, whose triggers report clashes under the
/// `links_short_code_key` and `links_custom_alias_key` names.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        let sql = format!("SELECT {COLUMNS} FROM links WHERE {condition} LIMIT 1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(LinkRecord::from))
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LinkFilter) {
    let mut separator = " WHERE ";

    if let Some(owner) = &filter.owner {
        qb.push(separator).push("owner = ").push_bind(owner.clone());
        separator = " AND ";
    }
    if let Some(is_active) = filter.is_active {
        qb.push(separator).push("is_active = ").push_bind(is_active);
        separator = " AND ";
    }
    if let Some(tag) = &filter.tag {
        qb.push(separator).push_bind(tag.clone()).push(" = ANY(tags)");
    }
}

fn order_clause(sort_by: &[SortBy]) -> String {
    let mut parts: Vec<String> = sort_by
        .iter()
        .map(|s| format!("{} {}", s.field.column(), s.direction.sql()))
        .collect();

    if parts.is_empty() {
        parts.push("created_at ASC".to_string());
    }
    parts.push("id ASC".to_string());

    parts.join(", ")
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLinkRecord) -> Result<LinkRecord, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links
                (long_url, short_code, custom_alias, owner, expiration_date, is_active, tags, salt, fingerprint)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(new_link.long_url)
            .bind(new_link.short_code)
            .bind(new_link.custom_alias)
            .bind(new_link.owner)
            .bind(new_link.expiration_date)
            .bind(new_link.is_active)
            .bind(new_link.tags)
            .bind(new_link.salt)
            .bind(new_link.fingerprint)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<LinkRecord>, AppError> {
        self.fetch_one_where("md5(long_url) = md5($1) AND long_url = $1", long_url)
            .await
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<LinkRecord>, AppError> {
        self.fetch_one_where("custom_alias = $1", alias).await
    }

    async fn find_by_short_code_or_alias(
        &self,
        value: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM links
            WHERE short_code = $1 OR custom_alias = $1
            ORDER BY (short_code = $1) DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(value)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(LinkRecord::from))
    }

    async fn exists_by_short_code(&self, code: &str) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM links WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn record_visit(&self, id: i64) -> Result<LinkRecord, AppError> {
        let sql = format!(
            r#"
            UPDATE links
            SET visit_count = visit_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .map(LinkRecord::from)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<LinkRecord, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE links SET updated_at = NOW()");

        if let Some(custom_alias) = patch.custom_alias {
            qb.push(", custom_alias = ").push_bind(custom_alias);
        }
        if let Some(is_active) = patch.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        if let Some(tags) = patch.tags {
            qb.push(", tags = ").push_bind(tags);
        }
        if let Some(expiration_date) = patch.expiration_date {
            qb.push(", expiration_date = ").push_bind(expiration_date);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {COLUMNS}"));

        qb.build_query_as::<LinkRow>()
            .fetch_optional(self.pool.as_ref())
            .await?
            .map(LinkRecord::from)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))
    }

    async fn paginate(
        &self,
        filter: LinkFilter,
        request: PageRequest,
    ) -> Result<Page<LinkRecord>, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM links");
        push_filter(&mut count_qb, &filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM links"));
        push_filter(&mut qb, &filter);
        qb.push(" ORDER BY ").push(order_clause(&request.sort_by));
        qb.push(" LIMIT ").push_bind(request.limit);
        qb.push(" OFFSET ").push_bind(request.offset());

        let rows = qb
            .build_query_as::<LinkRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        let results = rows.into_iter().map(LinkRecord::from).collect();

        Ok(Page::new(results, &request, total))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
