//! Regeneration of an add-on record for a release.
//!
//! [`Regenerator::regenerate`] derives checksum, manifest and screenshot
//! inventory for a release and writes them in one record write. A record
//! that already points at the release is left alone, so each release is
//! regenerated at most once.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::addon::cancellable;
use crate::addon::manifest::{AddonManifest, MANIFEST_PATH};
use crate::addon::model::{AddonRecord, Release, RepositoryInfo};
use crate::addon::ports::{
    AddonStore, ArchiveFormat, ArchiveService, GitRepository, InsertOutcome, RepositoryAccess,
};
use crate::addon::screenshots::discover_screenshots;
use crate::config::AddonConfig;
use crate::error::{CoreError, CoreResult, PortError};
use crate::hashing::md5_hex_reader;

/// What a call to [`Regenerator::regenerate`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationOutcome {
    /// The record already pointed at the release; nothing was touched.
    AlreadyCurrent,
    /// The record was inserted or overwritten for the release.
    Regenerated,
    /// A concurrent writer inserted the record for the same release first.
    /// Treated as success.
    LostRace,
}

/// Rebuilds [`AddonRecord`]s from repository content.
pub struct Regenerator<'a> {
    repos: &'a dyn RepositoryAccess,
    archives: &'a dyn ArchiveService,
    store: &'a dyn AddonStore,
    config: &'a AddonConfig,
}

impl<'a> Regenerator<'a> {
    pub fn new(
        repos: &'a dyn RepositoryAccess,
        archives: &'a dyn ArchiveService,
        store: &'a dyn AddonStore,
        config: &'a AddonConfig,
    ) -> Self {
        Self {
            repos,
            archives,
            store,
            config,
        }
    }

    /// Regenerate the add-on record of `repo` for `release`.
    ///
    /// All reads happen first; the single record write is the last action.
    pub async fn regenerate(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> CoreResult<RegenerationOutcome> {
        if release.repo_id != repo.id {
            return Err(CoreError::Validation(format!(
                "Release \"{}\" does not belong to repository \"{}\"",
                release.tag_name, repo.name
            )));
        }

        let existing = cancellable(cancel, self.store.find_by_repo(repo.id))
            .await?
            .map_err(|e| {
                CoreError::storage(format!("load add-on record for \"{}\"", repo.name), e)
            })?;

        if let Some(record) = &existing {
            if record.is_current_for(release.id) {
                tracing::debug!(
                    repo_id = repo.id,
                    release_id = release.id,
                    "Add-on record already current, skipping regeneration"
                );
                return Ok(RegenerationOutcome::AlreadyCurrent);
            }
        }

        let git = cancellable(
            cancel,
            self.repos.open_repository(&repo.owner_name, &repo.name),
        )
        .await?
        .map_err(|e| repo_access(repo, e))?;

        let md5 = self
            .archive_checksum(cancel, repo, git.as_ref(), &release.sha1)
            .await?;

        let commit = cancellable(cancel, git.get_commit(&release.sha1))
            .await?
            .map_err(|e| repo_access(repo, e))?;

        let manifest = self
            .read_manifest(cancel, repo, git.as_ref(), &commit.id)
            .await?;

        let entries = cancellable(cancel, git.list_tree_entries(&commit.id))
            .await?
            .map_err(|e| repo_access(repo, e))?;
        let screenshots = discover_screenshots(&entries);

        let mut record = existing.unwrap_or_else(|| AddonRecord::new(repo.id));
        record.release_id = Some(release.id);
        record.manifest = manifest;
        record.md5 = md5;
        record.screenshots = screenshots;

        // Past this point the write runs to completion.
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        self.persist(repo, release, &record).await
    }

    /// Build (or reuse) the release archive and hash it.
    async fn archive_checksum(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryInfo,
        git: &dyn GitRepository,
        revision: &str,
    ) -> CoreResult<String> {
        let unavailable = |source: PortError| CoreError::ArchiveUnavailable {
            repo: repo.name.clone(),
            revision: revision.to_string(),
            source,
        };

        let ticket = cancellable(
            cancel,
            self.archives
                .request_archive(repo.id, git, revision, ArchiveFormat::Zip),
        )
        .await?
        .map_err(unavailable)?;

        let location = cancellable(cancel, self.archives.await_archive(ticket))
            .await?
            .map_err(unavailable)?;

        let path = self.config.archive_root.join(&location.relative_path);
        let md5 = cancellable(cancel, hash_file(&path))
            .await?
            .map_err(|e| unavailable(e.into()))?;

        tracing::debug!(repo_id = repo.id, revision, %md5, "Hashed release archive");
        Ok(md5)
    }

    /// Read and validate the `info` manifest at a commit.
    async fn read_manifest(
        &self,
        cancel: &CancellationToken,
        repo: &RepositoryInfo,
        git: &dyn GitRepository,
        commit_id: &str,
    ) -> CoreResult<String> {
        let bytes = cancellable(cancel, git.get_file(commit_id, MANIFEST_PATH))
            .await?
            .map_err(|e| repo_access(repo, e))?
            .ok_or_else(|| CoreError::ManifestMissing {
                repo: repo.name.clone(),
                revision: commit_id.to_string(),
            })?;

        let text = String::from_utf8(bytes).map_err(|_| CoreError::ManifestParse {
            repo: repo.name.clone(),
            reason: "manifest is not valid UTF-8".into(),
        })?;

        AddonManifest::parse(&text)
            .map_err(|e| e.to_string())
            .and_then(|manifest| manifest.validate())
            .map_err(|reason| CoreError::ManifestParse {
                repo: repo.name.clone(),
                reason,
            })?;

        Ok(text)
    }

    async fn persist(
        &self,
        repo: &RepositoryInfo,
        release: &Release,
        record: &AddonRecord,
    ) -> CoreResult<RegenerationOutcome> {
        if record.id.is_some() {
            self.store.update_all(record).await.map_err(|e| {
                CoreError::storage(
                    format!("update add-on record for \"{}\"", repo.name),
                    e,
                )
            })?;
        } else {
            let outcome = self.store.insert(record).await.map_err(|e| {
                CoreError::storage(
                    format!("insert add-on record for \"{}\"", repo.name),
                    e,
                )
            })?;
            if outcome == InsertOutcome::Duplicate {
                return self.settle_lost_race(repo, release).await;
            }
        }

        tracing::info!(
            repo_id = repo.id,
            release_id = release.id,
            md5 = %record.md5,
            screenshots = record.screenshots.len(),
            "Regenerated add-on record"
        );
        Ok(RegenerationOutcome::Regenerated)
    }

    /// Decide the outcome after another writer inserted the record first.
    ///
    /// Only a record for the same release counts as this regeneration
    /// having happened; anything else is a conflict and leaves the release
    /// unreviewed.
    async fn settle_lost_race(
        &self,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> CoreResult<RegenerationOutcome> {
        let winner = self.store.find_by_repo(repo.id).await.map_err(|e| {
            CoreError::storage(format!("reload add-on record for \"{}\"", repo.name), e)
        })?;

        match winner.and_then(|record| record.release_id) {
            Some(release_id) if release_id == release.id => {
                tracing::warn!(
                    repo_id = repo.id,
                    release_id,
                    "Add-on record inserted concurrently, keeping the other writer's result"
                );
                Ok(RegenerationOutcome::LostRace)
            }
            recorded => {
                tracing::warn!(
                    repo_id = repo.id,
                    release_id = release.id,
                    recorded = ?recorded,
                    "Add-on record inserted concurrently for a different release"
                );
                Err(CoreError::Conflict(format!(
                    "add-on record for \"{}\" was written concurrently for release {}, not \"{}\"",
                    repo.name,
                    recorded.map_or_else(|| "none".to_string(), |id| format!("#{id}")),
                    release.tag_name
                )))
            }
        }
    }
}

async fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    md5_hex_reader(&mut file).await
}

fn repo_access(repo: &RepositoryInfo, source: PortError) -> CoreError {
    CoreError::RepositoryAccess {
        repo: repo.name.clone(),
        source,
    }
}
