//! Integration tests for the PostgreSQL add-on store.
//!
//! Exercises `PgStore` and the repository layer against a real database:
//! - Insert, update and lookup of add-on records
//! - Unique-violation mapping to `InsertOutcome::Duplicate`
//! - Release review persistence and admin checks
//! - Index listing filters and counts
//! - Descriptor conversion over stored rows

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use addonhub_core::addon::ports::{
    AccessControl, AddonStore, InsertOutcome, ReleaseStore, RepositoryCatalog,
};
use addonhub_core::addon::{Actor, AddonRecord, Converter, ReviewState};
use addonhub_core::config::AddonConfig;
use addonhub_core::roles::{ROLE_ADMIN, ROLE_PUBLISHER};
use addonhub_core::types::DbId;
use addonhub_db::models::notification::CreateNotification;
use addonhub_db::models::release::CreateRelease;
use addonhub_db::models::repository::CreateRepository;
use addonhub_db::models::user::CreateUser;
use addonhub_db::repositories::{NotificationRepo, ReleaseRepo, RepositoryRepo, UserRepo};
use addonhub_db::PgStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str, role: &str) -> DbId {
    let role_id = UserRepo::role_id(pool, role).await.unwrap().unwrap();
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role_id,
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_repo(pool: &PgPool, owner_id: DbId, name: &str) -> DbId {
    RepositoryRepo::create(
        pool,
        &CreateRepository {
            owner_id,
            name: name.to_string(),
            description: format!("The {name} add-on"),
            topics: vec!["worldmap".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .id
}

async fn new_release(pool: &PgPool, repo_id: DbId, tag: &str) -> DbId {
    ReleaseRepo::create(
        pool,
        &CreateRelease {
            repo_id,
            tag_name: tag.to_string(),
            sha1: format!("{tag}-sha"),
            title: format!("Release {tag}"),
            note: "Notes".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn record(repo_id: DbId, release_id: Option<DbId>, manifest: &str) -> AddonRecord {
    AddonRecord {
        release_id,
        manifest: manifest.to_string(),
        md5: "d41d8cd98f00b204e9800998ecf8427e".to_string(),
        screenshots: vec!["a.png".to_string(), "b.jpg".to_string()],
        ..AddonRecord::new(repo_id)
    }
}

// ---------------------------------------------------------------------------
// Add-on records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_insert_then_find_by_repo(pool: PgPool) {
    let owner = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let repo_id = new_repo(&pool, owner, "forest").await;
    let release_id = new_release(&pool, repo_id, "v1").await;
    let store = PgStore::new(pool);

    let outcome = store
        .insert(&record(repo_id, Some(release_id), "{}"))
        .await
        .unwrap();
    let InsertOutcome::Inserted(id) = outcome else {
        panic!("expected insert, got {outcome:?}");
    };

    let found = store.find_by_repo(repo_id).await.unwrap().unwrap();
    assert_eq!(found.id, Some(id));
    assert_eq!(found.release_id, Some(release_id));
    assert_eq!(found.screenshots, vec!["a.png", "b.jpg"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_insert_for_repo_is_duplicate(pool: PgPool) {
    let owner = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let repo_id = new_repo(&pool, owner, "forest").await;
    let store = PgStore::new(pool);

    store.insert(&record(repo_id, None, "{}")).await.unwrap();
    let second = store.insert(&record(repo_id, None, "{}")).await.unwrap();

    assert_eq!(second, InsertOutcome::Duplicate);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_all_overwrites_every_column(pool: PgPool) {
    let owner = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let repo_id = new_repo(&pool, owner, "forest").await;
    let first = new_release(&pool, repo_id, "v1").await;
    let second = new_release(&pool, repo_id, "v2").await;
    let store = PgStore::new(pool);

    store
        .insert(&record(repo_id, Some(first), "{}"))
        .await
        .unwrap();
    let mut stored = store.find_by_repo(repo_id).await.unwrap().unwrap();
    stored.release_id = Some(second);
    stored.manifest = r#"{"title": "Forest 2"}"#.to_string();
    stored.md5 = "0cc175b9c0f1b6a831c399e269772661".to_string();
    stored.screenshots = vec![];
    store.update_all(&stored).await.unwrap();

    let reloaded = store.find_by_repo(repo_id).await.unwrap().unwrap();
    assert_eq!(reloaded, stored);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_all_without_id_fails(pool: PgPool) {
    let store = PgStore::new(pool);
    let result = store.update_all(&record(1, None, "{}")).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Releases and roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_review_persists_flags(pool: PgPool) {
    let owner = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let repo_id = new_repo(&pool, owner, "forest").await;
    let release_id = new_release(&pool, repo_id, "v1").await;
    let store = PgStore::new(pool);

    let mut release = store
        .find_release(repo_id, release_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(release.review_state(), ReviewState::Pending);

    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    release.apply_rejection("missing license", now);
    store.update_review(&release).await.unwrap();

    let reloaded = store
        .find_release(repo_id, release_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.review_state(), ReviewState::Rejected);
    assert_eq!(reloaded.rejection_reason, "missing license");
    assert_eq!(reloaded.reviewed_at, Some(now));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_release_scoped_to_repository(pool: PgPool) {
    let owner = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let forest = new_repo(&pool, owner, "forest").await;
    let castle = new_repo(&pool, owner, "castle").await;
    let release_id = new_release(&pool, forest, "v1").await;
    let store = PgStore::new(pool);

    assert!(store
        .find_release(castle, release_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_admin_role_is_administrator(pool: PgPool) {
    let admin = new_user(&pool, "root", ROLE_ADMIN).await;
    let publisher = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let store = PgStore::new(pool);

    assert!(store
        .is_administrator(&Actor { user_id: admin })
        .await
        .unwrap());
    assert!(!store
        .is_administrator(&Actor { user_id: publisher })
        .await
        .unwrap());
    assert!(!store
        .is_administrator(&Actor { user_id: 9999 })
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Index listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_addon_page_filters_ineligible_repositories(pool: PgPool) {
    let penny = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let reserved = new_user(&pool, "supertux", ROLE_PUBLISHER).await;
    let store = PgStore::new(pool.clone());

    let listed = new_repo(&pool, penny, "forest").await;
    let unverified = new_repo(&pool, penny, "draft").await;
    let official = new_repo(&pool, reserved, "core-levels").await;
    let forked = RepositoryRepo::create(
        &pool,
        &CreateRepository {
            owner_id: penny,
            name: "forest-fork".to_string(),
            is_fork: true,
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .id;

    for repo_id in [listed, official, forked] {
        let release_id = new_release(&pool, repo_id, "v1").await;
        store
            .insert(&record(repo_id, Some(release_id), "{}"))
            .await
            .unwrap();
    }
    store.insert(&record(unverified, None, "{}")).await.unwrap();

    let page = RepositoryRepo::list_addon_page(&pool, "supertux", 50, 0)
        .await
        .unwrap();
    let ids: Vec<_> = page.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![listed]);
    assert_eq!(page[0].owner_name, "penny");
    assert_eq!(
        RepositoryRepo::count_addons(&pool, "supertux").await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_addon_page_paginates_by_id(pool: PgPool) {
    let penny = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let store = PgStore::new(pool.clone());
    let mut repo_ids = Vec::new();
    for name in ["a", "b", "c"] {
        let repo_id = new_repo(&pool, penny, name).await;
        let release_id = new_release(&pool, repo_id, "v1").await;
        store
            .insert(&record(repo_id, Some(release_id), "{}"))
            .await
            .unwrap();
        repo_ids.push(repo_id);
    }

    let second = RepositoryRepo::list_addon_page(&pool, "supertux", 2, 2)
        .await
        .unwrap();

    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, repo_ids[2]);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notifications_listed_newest_first(pool: PgPool) {
    let penny = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    for message in ["first", "second"] {
        NotificationRepo::create(
            &pool,
            &CreateNotification {
                user_id: penny,
                kind: "release_reviewed".to_string(),
                repo_id: None,
                release_id: None,
                message: message.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let listed = NotificationRepo::list_for_user(&pool, penny, 10, 0)
        .await
        .unwrap();
    let messages: Vec<_> = listed.iter().map(|n| n.message.as_str()).collect();
    assert_eq!(messages, vec!["second", "first"]);

    let tail = NotificationRepo::list_for_user(&pool, penny, 10, 1)
        .await
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].message, "first");
}

// ---------------------------------------------------------------------------
// Conversion over stored rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_converter_reads_through_pg_store(pool: PgPool) {
    let penny = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let base = new_repo(&pool, penny, "base").await;
    let forest = new_repo(&pool, penny, "forest").await;
    let store = PgStore::new(pool.clone());

    let base_release = new_release(&pool, base, "v1").await;
    store
        .insert(&record(base, Some(base_release), "{}"))
        .await
        .unwrap();
    let forest_release = new_release(&pool, forest, "v1").await;
    let manifest = format!(r#"{{"title": "Forest", "dependencies": ["base_{base}", "gone_424242"]}}"#);
    store
        .insert(&record(forest, Some(forest_release), &manifest))
        .await
        .unwrap();

    let config = AddonConfig::default();
    let d = Converter::new(&store, &store, &config)
        .to_descriptor_by_id(&CancellationToken::new(), forest)
        .await
        .unwrap();

    assert_eq!(d.id, format!("forest_{forest}"));
    assert_eq!(d.title, "Forest");
    assert_eq!(d.version.commit, "v1-sha");
    assert_eq!(d.origin_url, "http://localhost:3000/penny/forest");
    assert_eq!(d.dependencies.len(), 1);
    assert_eq!(d.dependencies[0].id, format!("base_{base}"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_converter_reports_unverified_record(pool: PgPool) {
    let penny = new_user(&pool, "penny", ROLE_PUBLISHER).await;
    let forest = new_repo(&pool, penny, "forest").await;
    let store = PgStore::new(pool);
    store.insert(&record(forest, None, "{}")).await.unwrap();

    let config = AddonConfig::default();
    let result = Converter::new(&store, &store, &config)
        .to_descriptor_by_id(&CancellationToken::new(), forest)
        .await;

    assert_matches!(
        result,
        Err(addonhub_core::error::CoreError::NotVerified { .. })
    );
}
