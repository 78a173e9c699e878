//! Public add-on descriptor and the pieces it is derived from.

use std::fmt;

use serde::Serialize;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Add-on type
// ---------------------------------------------------------------------------

/// Kind of content an add-on ships, inferred from repository topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonType {
    World,
    Levelset,
    Languagepack,
    Resourcepack,
    Addon,
    Worldmap,
}

impl AddonType {
    /// Topic-selectable types in priority order.
    pub const TOPIC_PRIORITY: [AddonType; 5] = [
        AddonType::World,
        AddonType::Levelset,
        AddonType::Languagepack,
        AddonType::Resourcepack,
        AddonType::Addon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Levelset => "levelset",
            Self::Languagepack => "languagepack",
            Self::Resourcepack => "resourcepack",
            Self::Addon => "addon",
            Self::Worldmap => "worldmap",
        }
    }

    /// Pick the type for a repository from its topics.
    ///
    /// Types are tried in [`TOPIC_PRIORITY`](Self::TOPIC_PRIORITY) order and
    /// the first one present among the topics wins; `worldmap` otherwise.
    pub fn from_topics<S: AsRef<str>>(topics: &[S]) -> Self {
        Self::TOPIC_PRIORITY
            .into_iter()
            .find(|ty| topics.iter().any(|t| t.as_ref() == ty.as_str()))
            .unwrap_or(Self::Worldmap)
    }
}

impl fmt::Display for AddonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dependency identifiers
// ---------------------------------------------------------------------------

/// Extract the repository id from an add-on identifier.
///
/// Identifiers are formatted `{name}_{id}`; the id is whatever follows the
/// last underscore. A bare number is accepted as well.
pub fn parse_addon_id(identifier: &str) -> Option<DbId> {
    let suffix = identifier
        .rsplit_once('_')
        .map_or(identifier, |(_, id)| id);
    suffix.parse().ok()
}

/// Public identifier of an add-on: `{name}_{repo_id}`.
pub fn format_addon_id(repo_name: &str, repo_id: DbId) -> String {
    format!("{repo_name}_{repo_id}")
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// Version block of a descriptor: the verified release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonVersion {
    pub commit: String,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
}

/// Screenshot base URL plus file names relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonScreenshots {
    pub base_url: String,
    pub files: Vec<String>,
}

/// Public, recursively-resolved view of an add-on. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddonDescriptor {
    pub id: String,
    pub version: AddonVersion,
    #[serde(rename = "type")]
    pub addon_type: AddonType,
    pub title: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub origin_url: String,
    /// Download URL of the release archive.
    pub url: String,
    /// Where the client re-fetches this descriptor.
    pub upstream_url: String,
    pub md5: String,
    pub screenshots: AddonScreenshots,
    pub dependencies: Vec<AddonDescriptor>,
}
