//! Conversion of stored add-on records into public descriptors.
//!
//! Dependencies declared in the manifest are resolved recursively into full
//! descriptors. Resolution is best effort: a dependency that cannot be
//! resolved (malformed id, missing or ineligible repository, no verified
//! release, cycle, depth cap, text the index cannot carry) is logged and left
//! out, never surfaced to the caller.

use std::collections::HashSet;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::addon::cancellable;
use crate::addon::descriptor::{
    format_addon_id, parse_addon_id, AddonDescriptor, AddonScreenshots, AddonType, AddonVersion,
};
use crate::addon::eligibility::is_addon_repository;
use crate::addon::manifest::AddonManifest;
use crate::addon::model::RepositoryInfo;
use crate::addon::ports::{AddonStore, ArchiveFormat, RepositoryCatalog};
use crate::addon::sexp;
use crate::config::AddonConfig;
use crate::error::{CoreError, CoreResult};
use crate::types::DbId;

/// Builds [`AddonDescriptor`]s from the add-on store and repository catalog.
pub struct Converter<'a> {
    catalog: &'a dyn RepositoryCatalog,
    store: &'a dyn AddonStore,
    config: &'a AddonConfig,
}

impl<'a> Converter<'a> {
    pub fn new(
        catalog: &'a dyn RepositoryCatalog,
        store: &'a dyn AddonStore,
        config: &'a AddonConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// Build the descriptor for a repository looked up by id.
    pub async fn to_descriptor_by_id(
        &self,
        cancel: &CancellationToken,
        repo_id: DbId,
    ) -> CoreResult<AddonDescriptor> {
        let repo = cancellable(cancel, self.catalog.find_repository(repo_id))
            .await?
            .map_err(|e| CoreError::storage(format!("load repository #{repo_id}"), e))?
            .ok_or(CoreError::NotFound {
                entity: "Repository",
                id: repo_id,
            })?;
        self.to_descriptor(cancel, &repo).await
    }

    /// Build the descriptor for `repo`, resolving its dependency graph.
    pub async fn to_descriptor(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryInfo,
    ) -> CoreResult<AddonDescriptor> {
        let mut path = HashSet::new();
        self.resolve(cancel, repo, &mut path, 0).await
    }

    /// Resolve one descriptor. `path` holds the repositories currently being
    /// resolved above this one and is restored before returning.
    fn resolve<'b>(
        &'b self,
        cancel: &'b CancellationToken,
        repo: &'b RepositoryInfo,
        path: &'b mut HashSet<DbId>,
        depth: usize,
    ) -> BoxFuture<'b, CoreResult<AddonDescriptor>> {
        async move {
            path.insert(repo.id);
            let result = self.build(cancel, repo, path, depth).await;
            path.remove(&repo.id);
            result
        }
        .boxed()
    }

    async fn build(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryInfo,
        path: &mut HashSet<DbId>,
        depth: usize,
    ) -> CoreResult<AddonDescriptor> {
        let record = cancellable(cancel, self.store.find_by_repo(repo.id))
            .await?
            .map_err(|e| {
                CoreError::storage(format!("load add-on record for \"{}\"", repo.name), e)
            })?
            .ok_or_else(|| CoreError::NoRecord {
                repo_id: repo.id,
                repo: repo.name.clone(),
            })?;

        let release_id = record.release_id.ok_or_else(|| CoreError::NotVerified {
            repo_id: repo.id,
            repo: repo.name.clone(),
        })?;

        let release = cancellable(cancel, self.catalog.find_release(repo.id, release_id))
            .await?
            .map_err(|e| CoreError::storage(format!("load release #{release_id}"), e))?
            .ok_or(CoreError::NotFound {
                entity: "Release",
                id: release_id,
            })?;

        let manifest = AddonManifest::parse(&record.manifest).map_err(|e| {
            CoreError::ManifestParse {
                repo: repo.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut dependencies = Vec::with_capacity(manifest.dependencies.len());
        for dep_id in &manifest.dependencies {
            if let Some(dep) = self
                .resolve_dependency(cancel, repo, dep_id, path, depth + 1)
                .await?
            {
                dependencies.push(dep);
            }
        }

        let origin_url = self.origin_url(repo);
        let descriptor = AddonDescriptor {
            id: format_addon_id(&repo.name, repo.id),
            version: AddonVersion {
                commit: release.sha1.clone(),
                title: release.title,
                description: release.note,
                created_at: release.created_at,
            },
            addon_type: AddonType::from_topics(&repo.topics),
            title: manifest.title,
            description: repo.description.clone(),
            author: repo.owner_name.clone(),
            license: manifest.license,
            url: format!(
                "{origin_url}/archive/{}.{}",
                release.sha1,
                ArchiveFormat::Zip.extension()
            ),
            upstream_url: format!(
                "{}/api/v1/repos/addons/{}",
                self.config.app_url_trimmed(),
                repo.id
            ),
            md5: record.md5,
            screenshots: AddonScreenshots {
                base_url: format!("{origin_url}/raw/commit/{}/screenshots/", release.sha1),
                files: record.screenshots,
            },
            dependencies,
            origin_url,
        };
        sexp::validate_fields(&descriptor)?;
        Ok(descriptor)
    }

    /// Resolve a declared dependency, or `None` if it has to be skipped.
    ///
    /// Only cancellation is propagated as an error.
    async fn resolve_dependency(
        &self,
        cancel: &CancellationToken,
        parent: &RepositoryInfo,
        identifier: &str,
        path: &mut HashSet<DbId>,
        depth: usize,
    ) -> CoreResult<Option<AddonDescriptor>> {
        let skip = |reason: &str| {
            tracing::warn!(
                repo_id = parent.id,
                dependency = identifier,
                reason,
                "Skipping unresolvable add-on dependency"
            );
        };

        let Some(dep_id) = parse_addon_id(identifier) else {
            skip("malformed identifier");
            return Ok(None);
        };
        if depth > self.config.max_dependency_depth {
            skip("dependency depth limit reached");
            return Ok(None);
        }
        if path.contains(&dep_id) {
            skip("dependency cycle");
            return Ok(None);
        }

        let dep_repo = match cancellable(cancel, self.catalog.find_repository(dep_id)).await? {
            Ok(Some(repo)) => repo,
            Ok(None) => {
                skip("repository not found");
                return Ok(None);
            }
            Err(e) => {
                skip(&e.to_string());
                return Ok(None);
            }
        };
        if !is_addon_repository(&dep_repo, self.config) {
            skip("repository is not an add-on candidate");
            return Ok(None);
        }

        match self.resolve(cancel, &dep_repo, path, depth).await {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(CoreError::Cancelled) => Err(CoreError::Cancelled),
            Err(e) => {
                skip(&e.to_string());
                Ok(None)
            }
        }
    }

    fn origin_url(&self, repo: &RepositoryInfo) -> String {
        format!(
            "{}{}/{}",
            self.config.app_url,
            urlencoding::encode(&repo.owner_name),
            urlencoding::encode(&repo.name)
        )
    }
}
