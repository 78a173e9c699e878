//! Repository rows, joined with the owner's username.

use addonhub_core::addon::RepositoryInfo;
use addonhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `repositories` table with `owner_name` resolved from `users`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Repository {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_name: String,
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub is_template: bool,
    pub is_private: bool,
    pub is_fork: bool,
    pub is_mirror: bool,
    pub is_empty: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a repository. Unset flags default to `false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRepository {
    pub owner_id: DbId,
    pub name: String,
    pub description: String,
    pub topics: Vec<String>,
    pub is_template: bool,
    pub is_private: bool,
    pub is_fork: bool,
    pub is_mirror: bool,
    pub is_empty: bool,
}

impl From<Repository> for RepositoryInfo {
    fn from(row: Repository) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            owner_name: row.owner_name,
            name: row.name,
            description: row.description,
            topics: row.topics,
            is_template: row.is_template,
            is_private: row.is_private,
            is_fork: row.is_fork,
            is_mirror: row.is_mirror,
            is_empty: row.is_empty,
        }
    }
}
