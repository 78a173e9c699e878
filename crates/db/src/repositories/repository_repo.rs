//! Repository for the `repositories` table.
//!
//! Every read joins `users` so rows carry the owner's username.

use addonhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::repository::{CreateRepository, Repository};

/// Column list for joined `repositories r JOIN users u` queries.
const COLUMNS: &str = "r.id, r.owner_id, u.username AS owner_name, r.name, r.description, \
                       r.topics, r.is_template, r.is_private, r.is_fork, r.is_mirror, r.is_empty, \
                       r.created_at, r.updated_at";

/// Repositories publishable as add-ons that have a verified record.
/// `$1` binds the reserved owner name.
///
/// Must stay in sync with `addonhub_core::addon::eligibility::is_addon_repository`.
const ADDON_FILTER: &str = "r.is_template = false AND r.is_private = false \
     AND r.is_fork = false AND r.is_mirror = false AND r.is_empty = false \
     AND u.username <> $1 \
     AND EXISTS (SELECT 1 FROM addon_repositories a \
                 WHERE a.repo_id = r.id AND a.release_id IS NOT NULL)";

/// Provides lookup and index listing for repositories.
pub struct RepositoryRepo;

impl RepositoryRepo {
    /// Insert a repository, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRepository) -> Result<Repository, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO repositories \
                 (owner_id, name, description, topics, is_template, is_private, is_fork, \
                  is_mirror, is_empty) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.topics)
        .bind(input.is_template)
        .bind(input.is_private)
        .bind(input.is_fork)
        .bind(input.is_mirror)
        .bind(input.is_empty)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Repository>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM repositories r \
             JOIN users u ON u.id = r.owner_id \
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, Repository>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of add-on repositories, ordered by id.
    pub async fn list_addon_page(
        pool: &PgPool,
        reserved_owner: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Repository>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM repositories r \
             JOIN users u ON u.id = r.owner_id \
             WHERE {ADDON_FILTER} \
             ORDER BY r.id ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Repository>(&query)
            .bind(reserved_owner)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of add-on repositories [`Self::list_addon_page`] pages over.
    pub async fn count_addons(pool: &PgPool, reserved_owner: &str) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM repositories r \
             JOIN users u ON u.id = r.owner_id \
             WHERE {ADDON_FILTER}"
        );
        sqlx::query_scalar(&query)
            .bind(reserved_owner)
            .fetch_one(pool)
            .await
    }
}
