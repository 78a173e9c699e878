//! Which repositories may be published as add-ons.

use crate::addon::model::RepositoryInfo;
use crate::config::AddonConfig;

/// Only regular, public, non-empty repositories outside the reserved
/// organisation are add-on candidates.
///
/// The index listing applies the same rule in SQL
/// (`addonhub_db::repositories::RepositoryRepo::list_addon_page`); the
/// converter applies it to declared dependencies.
pub fn is_addon_repository(repo: &RepositoryInfo, config: &AddonConfig) -> bool {
    !(repo.is_template
        || repo.is_private
        || repo.is_fork
        || repo.is_mirror
        || repo.is_empty
        || repo.owner_name == config.reserved_owner)
}
