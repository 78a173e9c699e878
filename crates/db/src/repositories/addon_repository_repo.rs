//! Repository for the `addon_repositories` table.

use addonhub_core::addon::AddonRecord;
use addonhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::addon_repository::AddonRepository;

/// Column list for `addon_repositories` queries.
const COLUMNS: &str = "id, repo_id, release_id, manifest, md5, screenshots, created_at, updated_at";

/// Provides persistence for published add-on metadata.
pub struct AddonRepositoryRepo;

impl AddonRepositoryRepo {
    /// Find the record for a repository.
    pub async fn find_by_repo(
        pool: &PgPool,
        repo_id: DbId,
    ) -> Result<Option<AddonRepository>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM addon_repositories WHERE repo_id = $1");
        sqlx::query_as::<_, AddonRepository>(&query)
            .bind(repo_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a record, returning the created row.
    ///
    /// Fails with a unique violation on `uq_addon_repositories_repo_id` when
    /// the repository already has a record.
    pub async fn create(pool: &PgPool, record: &AddonRecord) -> Result<AddonRepository, sqlx::Error> {
        let query = format!(
            "INSERT INTO addon_repositories (repo_id, release_id, manifest, md5, screenshots) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AddonRepository>(&query)
            .bind(record.repo_id)
            .bind(record.release_id)
            .bind(&record.manifest)
            .bind(&record.md5)
            .bind(&record.screenshots)
            .fetch_one(pool)
            .await
    }

    /// Overwrite every data column of the record with the given id.
    ///
    /// Returns `false` if no row with that id exists.
    pub async fn update_all(
        pool: &PgPool,
        id: DbId,
        record: &AddonRecord,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE addon_repositories \
             SET repo_id = $2, release_id = $3, manifest = $4, md5 = $5, screenshots = $6, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(record.repo_id)
        .bind(record.release_id)
        .bind(&record.manifest)
        .bind(&record.md5)
        .bind(&record.screenshots)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
