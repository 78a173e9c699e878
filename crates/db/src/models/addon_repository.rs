//! Add-on record rows.

use addonhub_core::addon::AddonRecord;
use addonhub_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `addon_repositories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AddonRepository {
    pub id: DbId,
    pub repo_id: DbId,
    pub release_id: Option<DbId>,
    pub manifest: String,
    pub md5: String,
    pub screenshots: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<AddonRepository> for AddonRecord {
    fn from(row: AddonRepository) -> Self {
        Self {
            id: Some(row.id),
            repo_id: row.repo_id,
            release_id: row.release_id,
            manifest: row.manifest,
            md5: row.md5,
            screenshots: row.screenshots,
        }
    }
}
