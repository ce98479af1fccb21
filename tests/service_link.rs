mod common;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::{FixedGenerator, SequenceGenerator, memory_service, memory_service_with};
use shortlink_engine::application::services::{ExpirationPolicy, LinkService};
use shortlink_engine::domain::entities::{
    LinkFilter, LinkPatch, LinkRecord, NewLinkRecord, Page, PageRequest,
};
use shortlink_engine::domain::repositories::LinkRepository;
use shortlink_engine::error::AppError;
use shortlink_engine::infrastructure::persistence::InMemoryLinkRepository;
use shortlink_engine::utils::code_generator::{ALPHABET, CODE_LENGTH};
use std::sync::Arc;

fn seed(code: &str, long_url: &str) -> NewLinkRecord {
    NewLinkRecord {
        long_url: long_url.to_string(),
        short_code: code.to_string(),
        custom_alias: None,
        owner: None,
        expiration_date: None,
        is_active: false,
        tags: Vec::new(),
        salt: "00".repeat(16),
        fingerprint: "ff".repeat(32),
    }
}

#[tokio::test]
async fn test_create_then_resolve_example() {
    let (_repo, service) = memory_service();

    let link = service
        .create("https://example.com/page".to_string(), None)
        .await
        .unwrap();

    assert_eq!(link.short_code.len(), CODE_LENGTH);
    assert!(link.short_code.bytes().all(|b| ALPHABET.contains(&b)));
    assert_eq!(link.visit_count, 0);
    assert_eq!(link.long_url, "https://example.com/page");

    let resolution = service.resolve(&link.short_code).await.unwrap();

    assert_eq!(resolution.long_url, "https://example.com/page");
    assert_eq!(resolution.stats.visit_count, 1);
}

#[tokio::test]
async fn test_create_is_idempotent_per_long_url() {
    let (repo, service) = memory_service();

    let first = service
        .create("https://example.com/same".to_string(), None)
        .await
        .unwrap();
    let inserts = repo.insert_count();

    let second = service
        .create("https://example.com/same".to_string(), None)
        .await
        .unwrap();

    assert_eq!(first.short_code, second.short_code);
    assert_eq!(first.id, second.id);
    assert_eq!(repo.insert_count(), inserts);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_create_trims_long_url_before_dedupe() {
    let (repo, service) = memory_service();

    let first = service
        .create("https://example.com/trim".to_string(), None)
        .await
        .unwrap();
    let second = service
        .create("  https://example.com/trim  ".to_string(), None)
        .await
        .unwrap();

    assert_eq!(first.short_code, second.short_code);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_alias_conflict_leaves_first_record_untouched() {
    let (repo, service) = memory_service();

    let first = service
        .create(
            "https://example.com/one".to_string(),
            Some("promo".to_string()),
        )
        .await
        .unwrap();

    let err = service
        .create(
            "https://example.com/two".to_string(),
            Some("promo".to_string()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AliasConflict { ref alias } if alias == "promo"));
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.get(first.id), Some(first));
}

#[tokio::test]
async fn test_alias_cannot_shadow_existing_short_code() {
    let (_repo, service) = memory_service_with(SequenceGenerator::new(&["Xy12Ab"]));

    service
        .create("https://example.com/coded".to_string(), None)
        .await
        .unwrap();

    let err = service
        .create(
            "https://example.com/other".to_string(),
            Some("Xy12Ab".to_string()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AliasConflict { .. }));
}

#[tokio::test]
async fn test_generated_code_never_shadows_existing_alias() {
    let (_repo, service) = memory_service_with(SequenceGenerator::new(&["Aaaaa1", "Sale24"]));

    service
        .create(
            "https://example.com/a".to_string(),
            Some("Sale24".to_string()),
        )
        .await
        .unwrap();
    let second = service
        .create("https://example.com/b".to_string(), None)
        .await
        .unwrap();

    assert_ne!(second.short_code, "Sale24");
    let resolved = service.resolve("Sale24").await.unwrap();
    assert_eq!(resolved.long_url, "https://example.com/a");
}

#[tokio::test]
async fn test_resolve_by_alias() {
    let (_repo, service) = memory_service();

    let link = service
        .create(
            "https://example.com/aliased".to_string(),
            Some("launch".to_string()),
        )
        .await
        .unwrap();

    let by_alias = service.resolve("launch").await.unwrap();
    let by_code = service.resolve(&link.short_code).await.unwrap();

    assert_eq!(by_alias.long_url, "https://example.com/aliased");
    assert_eq!(by_alias.stats.custom_alias.as_deref(), Some("launch"));
    assert_eq!(by_code.stats.visit_count, 2);
}

#[tokio::test]
async fn test_resolve_unknown_is_not_found() {
    let (_repo, service) = memory_service();

    let err = service.resolve("nope42").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_n_resolutions_add_n_visits() {
    let (repo, service) = memory_service();

    let link = service
        .create("https://example.com/counted".to_string(), None)
        .await
        .unwrap();

    for _ in 0..25 {
        service.resolve(&link.short_code).await.unwrap();
    }

    assert_eq!(repo.get(link.id).unwrap().visit_count, 25);
}

#[tokio::test]
async fn test_generation_exhausted_after_cap() {
    let (repo, service) = memory_service_with(FixedGenerator("AAAAAA"));
    repo.insert(seed("AAAAAA", "https://example.com/taken"))
        .await
        .unwrap();
    let inserts = repo.insert_count();

    let err = service
        .create("https://example.com/new".to_string(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::GenerationExhausted { attempts: 10 }));
    assert_eq!(repo.insert_count(), inserts);
}

#[tokio::test]
async fn test_collision_is_retried_with_next_code() {
    let (repo, service) = memory_service_with(SequenceGenerator::new(&["AAAAAA", "BBBBBB"]));
    repo.insert(seed("AAAAAA", "https://example.com/taken"))
        .await
        .unwrap();

    let link = service
        .create("https://example.com/new".to_string(), None)
        .await
        .unwrap();

    assert_eq!(link.short_code, "BBBBBB");
}

/// Store whose pre-check never sees existing codes or aliases, so every
/// collision surfaces at insert time.
struct BlindPrecheck(InMemoryLinkRepository);

#[async_trait]
impl LinkRepository for BlindPrecheck {
    async fn insert(&self, new_link: NewLinkRecord) -> Result<LinkRecord, AppError> {
        self.0.insert(new_link).await
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<LinkRecord>, AppError> {
        self.0.find_by_long_url(long_url).await
    }

    async fn find_by_alias(&self, _alias: &str) -> Result<Option<LinkRecord>, AppError> {
        Ok(None)
    }

    async fn find_by_short_code_or_alias(
        &self,
        value: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        self.0.find_by_short_code_or_alias(value).await
    }

    async fn exists_by_short_code(&self, _code: &str) -> Result<bool, AppError> {
        Ok(false)
    }

    async fn record_visit(&self, id: i64) -> Result<LinkRecord, AppError> {
        self.0.record_visit(id).await
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<LinkRecord, AppError> {
        self.0.update(id, patch).await
    }

    async fn paginate(
        &self,
        filter: LinkFilter,
        request: PageRequest,
    ) -> Result<Page<LinkRecord>, AppError> {
        self.0.paginate(filter, request).await
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_insert_race_lost_once_is_retried() {
    let inner = InMemoryLinkRepository::new();
    inner
        .insert(seed("RACE01", "https://example.com/winner"))
        .await
        .unwrap();
    let repo = Arc::new(BlindPrecheck(inner));
    let service = LinkService::new(
        repo.clone(),
        Arc::new(SequenceGenerator::new(&["RACE01", "RACE02"])),
    );

    let link = service
        .create("https://example.com/loser".to_string(), None)
        .await
        .unwrap();

    assert_eq!(link.short_code, "RACE02");
    assert_eq!(repo.0.len(), 2);
}

#[tokio::test]
async fn test_insert_rejects_code_equal_to_existing_alias() {
    let inner = InMemoryLinkRepository::new();
    let mut aliased = seed("AAAAAA", "https://example.com/a");
    aliased.custom_alias = Some("Sale24".to_string());
    inner.insert(aliased).await.unwrap();
    let repo = Arc::new(BlindPrecheck(inner));
    let service = LinkService::new(
        repo.clone(),
        Arc::new(SequenceGenerator::new(&["Sale24", "BBBBBB"])),
    );

    let link = service
        .create("https://example.com/b".to_string(), None)
        .await
        .unwrap();

    assert_eq!(link.short_code, "BBBBBB");
    let resolved = service.resolve("Sale24").await.unwrap();
    assert_eq!(resolved.long_url, "https://example.com/a");
}

#[tokio::test]
async fn test_insert_races_share_attempt_cap() {
    let inner = InMemoryLinkRepository::new();
    inner
        .insert(seed("AAAAAA", "https://example.com/winner"))
        .await
        .unwrap();
    let repo = Arc::new(BlindPrecheck(inner));
    let service = LinkService::new(repo, Arc::new(FixedGenerator("AAAAAA")));

    let err = service
        .create("https://example.com/loser".to_string(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::GenerationExhausted { attempts: 10 }));
}

#[tokio::test]
async fn test_expired_link_resolves_by_default() {
    let (repo, service) = memory_service();
    let link = service
        .create("https://example.com/old".to_string(), None)
        .await
        .unwrap();
    repo.update(
        link.id,
        LinkPatch {
            expiration_date: Some(Some(Utc::now() - Duration::hours(1))),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let resolution = service.resolve(&link.short_code).await.unwrap();

    assert!(resolution.stats.expiration_date.is_some());
    assert_eq!(resolution.stats.visit_count, 1);
}

#[tokio::test]
async fn test_expired_link_refused_when_enforced() {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let service = LinkService::with_options(
        repo.clone(),
        Arc::new(shortlink_engine::utils::code_generator::RandomCodeGenerator),
        10,
        ExpirationPolicy::Enforce,
        3,
    );
    let link = service
        .create("https://example.com/old".to_string(), None)
        .await
        .unwrap();
    repo.update(
        link.id,
        LinkPatch {
            expiration_date: Some(Some(Utc::now() - Duration::hours(1))),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = service.resolve(&link.short_code).await.unwrap_err();

    assert!(matches!(err, AppError::Expired { .. }));
    assert_eq!(repo.get(link.id).unwrap().visit_count, 0);
}

#[tokio::test]
async fn test_update_alias_and_tags() {
    let (_repo, service) = memory_service();
    let link = service
        .create("https://example.com/managed".to_string(), None)
        .await
        .unwrap();

    let updated = service
        .update(
            &link.short_code,
            LinkPatch {
                custom_alias: Some(Some("managed".to_string())),
                tags: Some(vec!["docs".to_string()]),
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.custom_alias.as_deref(), Some("managed"));
    assert_eq!(updated.tags, vec!["docs".to_string()]);
    assert!(updated.is_active);
    assert_eq!(updated.visit_count, link.visit_count);
    assert_eq!(updated.short_code, link.short_code);

    let resolution = service.resolve("managed").await.unwrap();
    assert_eq!(resolution.long_url, "https://example.com/managed");
}

#[tokio::test]
async fn test_update_to_taken_alias_conflicts() {
    let (_repo, service) = memory_service();
    service
        .create(
            "https://example.com/a".to_string(),
            Some("taken".to_string()),
        )
        .await
        .unwrap();
    let other = service
        .create("https://example.com/b".to_string(), None)
        .await
        .unwrap();

    let err = service
        .update(
            &other.short_code,
            LinkPatch {
                custom_alias: Some(Some("taken".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AliasConflict { .. }));
}

#[tokio::test]
async fn test_list_paginates_and_clamps_limit() {
    let (_repo, service) = memory_service();
    for i in 0..12 {
        service
            .create(format!("https://example.com/{i}"), None)
            .await
            .unwrap();
    }

    let page = service
        .list(
            LinkFilter::default(),
            PageRequest {
                limit: 5,
                page: 3,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(page.results.len(), 2);
    assert_eq!(page.total_results, 12);
    assert_eq!(page.total_pages, 3);

    let clamped = service
        .list(
            LinkFilter::default(),
            PageRequest {
                limit: 1000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(clamped.limit, 100);
    assert_eq!(clamped.results.len(), 12);
}

#[tokio::test]
async fn test_list_huge_page_is_empty() {
    let (_repo, service) = memory_service();
    service
        .create("https://example.com/only".to_string(), None)
        .await
        .unwrap();

    let page = service
        .list(
            LinkFilter::default(),
            PageRequest {
                limit: 100,
                page: i64::MAX,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(page.results.is_empty());
    assert_eq!(page.total_results, 1);
    assert_eq!(page.page, i64::MAX);
}
