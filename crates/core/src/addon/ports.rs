//! Collaborator interfaces the pipeline depends on.
//!
//! Implementations live outside this crate: `addonhub-db` provides the
//! storage, catalog and access-control ports, `addonhub-events` provides the
//! notifier, and the forge supplies version control and archives. Every
//! method returns a [`PortError`]; the pipeline attaches context when it
//! converts that into a [`CoreError`](crate::error::CoreError).

use std::path::PathBuf;

use async_trait::async_trait;

use crate::addon::model::{Actor, AddonRecord, Release, RepositoryInfo};
use crate::error::PortError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Version control
// ---------------------------------------------------------------------------

/// A commit resolved from a revision string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash.
    pub id: String,
    pub time: Timestamp,
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// An opened repository. Dropping the handle closes it.
#[async_trait]
pub trait GitRepository: Send + Sync {
    /// Resolve a commit hash, tag or branch name to a commit.
    async fn get_commit(&self, revision: &str) -> Result<CommitInfo, PortError>;

    /// Read a file's bytes at a commit; `None` when the path does not exist.
    async fn get_file(&self, commit_id: &str, path: &str) -> Result<Option<Vec<u8>>, PortError>;

    /// Recursively list every entry of the tree at a commit.
    async fn list_tree_entries(&self, commit_id: &str) -> Result<Vec<TreeEntry>, PortError>;
}

/// Opens repositories by owner and name.
#[async_trait]
pub trait RepositoryAccess: Send + Sync {
    async fn open_repository(
        &self,
        owner_name: &str,
        repo_name: &str,
    ) -> Result<Box<dyn GitRepository>, PortError>;
}

// ---------------------------------------------------------------------------
// Archives
// ---------------------------------------------------------------------------

/// Archive container formats requested from the forge. The game client only
/// installs zip archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
        }
    }
}

/// Handle for an archive build that has been requested (or reused).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTicket {
    pub repo_id: DbId,
    pub revision: String,
    pub format: ArchiveFormat,
}

/// Where a finished archive can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    /// Path relative to [`AddonConfig::archive_root`](crate::config::AddonConfig).
    pub relative_path: PathBuf,
}

/// Produces deterministic archives of a revision.
#[async_trait]
pub trait ArchiveService: Send + Sync {
    /// Start an archive build for `revision`, or attach to an existing one.
    async fn request_archive(
        &self,
        repo_id: DbId,
        repo: &dyn GitRepository,
        revision: &str,
        format: ArchiveFormat,
    ) -> Result<ArchiveTicket, PortError>;

    /// Wait until the requested archive is available on disk.
    async fn await_archive(&self, ticket: ArchiveTicket) -> Result<ArchiveLocation, PortError>;
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Result of inserting an add-on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(DbId),
    /// A record for the same repository already exists (unique-key violation).
    Duplicate,
}

/// Persistence for [`AddonRecord`]s, unique per repository.
#[async_trait]
pub trait AddonStore: Send + Sync {
    async fn find_by_repo(&self, repo_id: DbId) -> Result<Option<AddonRecord>, PortError>;

    async fn insert(&self, record: &AddonRecord) -> Result<InsertOutcome, PortError>;

    /// Overwrite every column of an existing record.
    async fn update_all(&self, record: &AddonRecord) -> Result<(), PortError>;
}

/// Read access to the forge's repositories and releases.
#[async_trait]
pub trait RepositoryCatalog: Send + Sync {
    async fn find_repository(&self, repo_id: DbId) -> Result<Option<RepositoryInfo>, PortError>;

    async fn find_release(
        &self,
        repo_id: DbId,
        release_id: DbId,
    ) -> Result<Option<Release>, PortError>;
}

/// Persists the review columns of a release.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Write `is_verified`, `is_rejected`, `rejection_reason` and `reviewed_at`.
    async fn update_review(&self, release: &Release) -> Result<(), PortError>;
}

// ---------------------------------------------------------------------------
// Authorization and notification
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn is_administrator(&self, actor: &Actor) -> Result<bool, PortError>;
}

#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Tell the repository owner that one of their releases was reviewed.
    async fn notify_owner_of_review(
        &self,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> Result<(), PortError>;
}
