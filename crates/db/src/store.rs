//! Adapter from the repository layer to the pipeline's collaborator ports.

use addonhub_core::addon::ports::{
    AccessControl, AddonStore, InsertOutcome, ReleaseStore, RepositoryCatalog,
};
use addonhub_core::addon::{Actor, AddonRecord, Release, RepositoryInfo};
use addonhub_core::error::PortError;
use addonhub_core::types::DbId;
use async_trait::async_trait;

use crate::repositories::{AddonRepositoryRepo, ReleaseRepo, RepositoryRepo, UserRepo};
use crate::DbPool;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Implements the storage, catalog and access-control ports over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl AddonStore for PgStore {
    async fn find_by_repo(&self, repo_id: DbId) -> Result<Option<AddonRecord>, PortError> {
        let row = AddonRepositoryRepo::find_by_repo(&self.pool, repo_id).await?;
        Ok(row.map(AddonRecord::from))
    }

    async fn insert(&self, record: &AddonRecord) -> Result<InsertOutcome, PortError> {
        match AddonRepositoryRepo::create(&self.pool, record).await {
            Ok(row) => Ok(InsertOutcome::Inserted(row.id)),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(repo_id = record.repo_id, "Add-on record already exists");
                Ok(InsertOutcome::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_all(&self, record: &AddonRecord) -> Result<(), PortError> {
        let id = record
            .id
            .ok_or_else(|| format!("add-on record for repository #{} has no id", record.repo_id))?;
        if AddonRepositoryRepo::update_all(&self.pool, id, record).await? {
            Ok(())
        } else {
            Err(format!("add-on record #{id} no longer exists").into())
        }
    }
}

#[async_trait]
impl RepositoryCatalog for PgStore {
    async fn find_repository(&self, repo_id: DbId) -> Result<Option<RepositoryInfo>, PortError> {
        let row = RepositoryRepo::find_by_id(&self.pool, repo_id).await?;
        Ok(row.map(RepositoryInfo::from))
    }

    async fn find_release(
        &self,
        repo_id: DbId,
        release_id: DbId,
    ) -> Result<Option<Release>, PortError> {
        let row = ReleaseRepo::find_for_repo(&self.pool, repo_id, release_id).await?;
        Ok(row.map(Release::from))
    }
}

#[async_trait]
impl ReleaseStore for PgStore {
    async fn update_review(&self, release: &Release) -> Result<(), PortError> {
        if ReleaseRepo::update_review(&self.pool, release).await? {
            Ok(())
        } else {
            Err(format!("release #{} no longer exists", release.id).into())
        }
    }
}

#[async_trait]
impl AccessControl for PgStore {
    async fn is_administrator(&self, actor: &Actor) -> Result<bool, PortError> {
        Ok(UserRepo::is_admin(&self.pool, actor.user_id).await?)
    }
}
