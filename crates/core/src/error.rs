//! Domain error type shared by every add-on operation.
//!
//! Collaborator failures arrive as [`PortError`] and are wrapped with the
//! repository or release they concern, so callers can act on them without
//! re-deriving context.

use crate::types::DbId;

/// Boxed error returned by collaborator ports (storage, VCS, archives).
pub type PortError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the verification, conversion and rendering pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A non-administrator attempted a review action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No add-on record has ever been generated for the repository.
    #[error("No add-on record for repository \"{repo}\" (#{repo_id})")]
    NoRecord { repo_id: DbId, repo: String },

    /// A record exists but carries no verified release pointer.
    #[error("Add-on repository \"{repo}\" (#{repo_id}) has no verified release")]
    NotVerified { repo_id: DbId, repo: String },

    /// The `info` manifest is absent at the revision being verified.
    #[error("Repository \"{repo}\" has no 'info' manifest at {revision}")]
    ManifestMissing { repo: String, revision: String },

    /// The manifest exists but is not valid manifest JSON.
    #[error("Malformed 'info' manifest in repository \"{repo}\": {reason}")]
    ManifestParse { repo: String, reason: String },

    /// The archive layer failed to produce or expose the archive.
    #[error("Archive unavailable for \"{repo}\" at {revision}: {source}")]
    ArchiveUnavailable {
        repo: String,
        revision: String,
        #[source]
        source: PortError,
    },

    /// The version-control layer failed.
    #[error("Repository access failed for \"{repo}\": {source}")]
    RepositoryAccess {
        repo: String,
        #[source]
        source: PortError,
    },

    /// A persistence read or write failed.
    #[error("Storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: PortError,
    },

    /// A release or repository the caller referenced does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A concurrent writer left state that contradicts this operation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A caller-side precondition was violated.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A string holds a character the S-expression index cannot carry.
    #[error("Field '{field}' contains a character the index format cannot carry: {value:?}")]
    InvalidFieldValue { field: &'static str, value: String },

    /// The caller's cancellation token fired before the operation finished.
    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Wrap a storage port failure with a short description of what was attempted.
    pub fn storage(context: impl Into<String>, source: PortError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// The message shown to end users for this failure.
    ///
    /// Descriptor failures read as "add-on not available"; review failures
    /// read as "forbidden" or "verification failed: <reason>".
    pub fn user_message(&self) -> String {
        match self {
            Self::Forbidden(_) => "forbidden".to_string(),
            Self::NoRecord { .. } | Self::NotVerified { .. } => "add-on not available".to_string(),
            other => format!("verification failed: {other}"),
        }
    }
}

/// Convenience alias for results carrying [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
