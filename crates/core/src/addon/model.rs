//! Records the pipeline reads and writes.
//!
//! [`AddonRecord`] is owned by this crate. [`Release`] and [`RepositoryInfo`]
//! belong to the surrounding forge; the review state machine only mutates
//! the review fields of a release.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Add-on record
// ---------------------------------------------------------------------------

/// Published metadata for one add-on repository.
///
/// Reflects exactly one verified release at a time. Checksum, manifest and
/// screenshots are always regenerated and written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonRecord {
    /// Storage id; `None` until the record is first inserted.
    pub id: Option<DbId>,
    pub repo_id: DbId,
    /// Release this record's data was derived from.
    pub release_id: Option<DbId>,
    /// Raw contents of the `info` manifest at the verified release.
    pub manifest: String,
    /// Hex MD5 of the release archive.
    pub md5: String,
    /// Screenshot file names directly under `screenshots/`, in tree order.
    pub screenshots: Vec<String>,
}

impl AddonRecord {
    /// An empty, not yet persisted record for a repository.
    pub fn new(repo_id: DbId) -> Self {
        Self {
            id: None,
            repo_id,
            release_id: None,
            manifest: String::new(),
            md5: String::new(),
            screenshots: Vec::new(),
        }
    }

    /// Whether this record already reflects the given release.
    pub fn is_current_for(&self, release_id: DbId) -> bool {
        self.release_id == Some(release_id)
    }
}

// ---------------------------------------------------------------------------
// Release and review state
// ---------------------------------------------------------------------------

/// Where a release stands in review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Verified,
    Rejected,
}

/// A tagged release of a repository, as stored by the forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: DbId,
    pub repo_id: DbId,
    pub tag_name: String,
    /// Commit hash the tag points to.
    pub sha1: String,
    pub title: String,
    pub note: String,
    pub created_at: Timestamp,
    pub is_verified: bool,
    pub is_rejected: bool,
    pub rejection_reason: String,
    pub reviewed_at: Option<Timestamp>,
}

impl Release {
    /// Current review state derived from the verification flags.
    pub fn review_state(&self) -> ReviewState {
        match (self.is_verified, self.is_rejected) {
            (true, _) => ReviewState::Verified,
            (false, true) => ReviewState::Rejected,
            (false, false) => ReviewState::Pending,
        }
    }

    /// Mark the release verified, clearing any earlier rejection.
    pub fn apply_verification(&mut self, now: Timestamp) {
        self.is_verified = true;
        self.is_rejected = false;
        self.rejection_reason.clear();
        self.reviewed_at = Some(now);
    }

    /// Mark the release rejected with the given reason.
    pub fn apply_rejection(&mut self, reason: &str, now: Timestamp) {
        self.is_verified = false;
        self.is_rejected = true;
        self.rejection_reason = reason.to_string();
        self.reviewed_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Repository and actor
// ---------------------------------------------------------------------------

/// Live repository attributes the descriptor is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
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
}

/// The user performing a review action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
}
