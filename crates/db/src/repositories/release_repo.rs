//! Repository for the `releases` table.

use addonhub_core::addon::Release;
use addonhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::release::{CreateRelease, ReleaseRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, repo_id, tag_name, sha1, title, note, is_verified, is_rejected, \
                       rejection_reason, reviewed_at, created_at";

/// Provides read and review-update operations for releases.
pub struct ReleaseRepo;

impl ReleaseRepo {
    /// Insert a new, pending release.
    pub async fn create(pool: &PgPool, input: &CreateRelease) -> Result<ReleaseRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO releases (repo_id, tag_name, sha1, title, note) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReleaseRow>(&query)
            .bind(input.repo_id)
            .bind(&input.tag_name)
            .bind(&input.sha1)
            .bind(&input.title)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReleaseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM releases WHERE id = $1");
        sqlx::query_as::<_, ReleaseRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a release only if it belongs to the given repository.
    pub async fn find_for_repo(
        pool: &PgPool,
        repo_id: DbId,
        id: DbId,
    ) -> Result<Option<ReleaseRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM releases WHERE id = $1 AND repo_id = $2");
        sqlx::query_as::<_, ReleaseRow>(&query)
            .bind(id)
            .bind(repo_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist the review columns of `release`.
    ///
    /// Returns `false` if the release no longer exists.
    pub async fn update_review(pool: &PgPool, release: &Release) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE releases \
             SET is_verified = $2, is_rejected = $3, rejection_reason = $4, reviewed_at = $5 \
             WHERE id = $1",
        )
        .bind(release.id)
        .bind(release.is_verified)
        .bind(release.is_rejected)
        .bind(&release.rejection_reason)
        .bind(release.reviewed_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
