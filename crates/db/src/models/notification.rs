//! Notification rows.

use addonhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Notification kind written when a release is verified or rejected.
pub const KIND_RELEASE_REVIEWED: &str = "release_reviewed";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub repo_id: Option<DbId>,
    pub release_id: Option<DbId>,
    pub message: String,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub kind: String,
    pub repo_id: Option<DbId>,
    pub release_id: Option<DbId>,
    pub message: String,
}
