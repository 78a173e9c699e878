//! Release rows.

use addonhub_core::addon::Release;
use addonhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `releases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReleaseRow {
    pub id: DbId,
    pub repo_id: DbId,
    pub tag_name: String,
    pub sha1: String,
    pub title: String,
    pub note: String,
    pub is_verified: bool,
    pub is_rejected: bool,
    pub rejection_reason: String,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a release. New releases start pending review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelease {
    pub repo_id: DbId,
    pub tag_name: String,
    pub sha1: String,
    pub title: String,
    pub note: String,
}

impl From<ReleaseRow> for Release {
    fn from(row: ReleaseRow) -> Self {
        Self {
            id: row.id,
            repo_id: row.repo_id,
            tag_name: row.tag_name,
            sha1: row.sha1,
            title: row.title,
            note: row.note,
            created_at: row.created_at,
            is_verified: row.is_verified,
            is_rejected: row.is_rejected,
            rejection_reason: row.rejection_reason,
            reviewed_at: row.reviewed_at,
        }
    }
}
