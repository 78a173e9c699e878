//! Release review state machine.
//!
//! A release starts `pending` and moves to `verified` or `rejected` on an
//! administrator's decision. Re-reviewing in either direction is allowed.
//! Verification is all-or-nothing: the release's review fields change only
//! after the add-on record has been regenerated for it.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::addon::cancellable;
use crate::addon::model::{Actor, Release, RepositoryInfo};
use crate::addon::ports::{AccessControl, ReleaseStore, ReviewNotifier};
use crate::addon::regeneration::{RegenerationOutcome, Regenerator};
use crate::error::{CoreError, CoreResult};

/// Applies review decisions to releases.
pub struct ReviewService<'a> {
    access: &'a dyn AccessControl,
    releases: &'a dyn ReleaseStore,
    notifier: &'a dyn ReviewNotifier,
    regenerator: Regenerator<'a>,
}

impl<'a> ReviewService<'a> {
    pub fn new(
        access: &'a dyn AccessControl,
        releases: &'a dyn ReleaseStore,
        notifier: &'a dyn ReviewNotifier,
        regenerator: Regenerator<'a>,
    ) -> Self {
        Self {
            access,
            releases,
            notifier,
            regenerator,
        }
    }

    /// Verify `release`, regenerating the add-on record first.
    ///
    /// Returns the release with its review fields updated. If regeneration
    /// fails the release is not modified and the error propagates.
    pub async fn verify(
        &self,
        cancel: &CancellationToken,
        actor: &Actor,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> CoreResult<Release> {
        self.require_admin(cancel, actor, "verify").await?;

        let outcome = self.regenerator.regenerate(cancel, repo, release).await?;
        if outcome == RegenerationOutcome::AlreadyCurrent {
            tracing::debug!(
                repo_id = repo.id,
                release_id = release.id,
                "Re-verifying release whose add-on data is already current"
            );
        }

        let mut updated = release.clone();
        updated.apply_verification(Utc::now());
        self.persist(repo, &updated).await?;

        tracing::info!(
            user_id = actor.user_id,
            repo_id = repo.id,
            release_id = release.id,
            tag = %release.tag_name,
            "Add-on release verified"
        );

        self.notify(repo, &updated).await;
        Ok(updated)
    }

    /// Reject `release` with a reason. The add-on record is never touched.
    pub async fn reject(
        &self,
        cancel: &CancellationToken,
        actor: &Actor,
        repo: &RepositoryInfo,
        release: &Release,
        reason: &str,
    ) -> CoreResult<Release> {
        self.require_admin(cancel, actor, "reject").await?;

        if release.repo_id != repo.id {
            return Err(CoreError::Validation(format!(
                "Release \"{}\" does not belong to repository \"{}\"",
                release.tag_name, repo.name
            )));
        }
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let mut updated = release.clone();
        updated.apply_rejection(reason, Utc::now());
        self.persist(repo, &updated).await?;

        tracing::info!(
            user_id = actor.user_id,
            repo_id = repo.id,
            release_id = release.id,
            tag = %release.tag_name,
            reason,
            "Add-on release rejected"
        );

        self.notify(repo, &updated).await;
        Ok(updated)
    }

    async fn require_admin(
        &self,
        cancel: &CancellationToken,
        actor: &Actor,
        action: &str,
    ) -> CoreResult<()> {
        let is_admin = cancellable(cancel, self.access.is_administrator(actor))
            .await?
            .map_err(|e| CoreError::storage("check administrator role", e))?;
        if !is_admin {
            tracing::warn!(user_id = actor.user_id, action, "Non-admin review attempt");
            return Err(CoreError::Forbidden(format!(
                "Only admins can {action} add-on releases."
            )));
        }
        Ok(())
    }

    async fn persist(&self, repo: &RepositoryInfo, release: &Release) -> CoreResult<()> {
        self.releases.update_review(release).await.map_err(|e| {
            CoreError::storage(
                format!(
                    "update release \"{}\" of \"{}\"",
                    release.tag_name, repo.name
                ),
                e,
            )
        })
    }

    /// The decision is already committed, so delivery failures are only logged.
    async fn notify(&self, repo: &RepositoryInfo, release: &Release) {
        if let Err(e) = self.notifier.notify_owner_of_review(repo, release).await {
            tracing::warn!(
                error = %e,
                repo_id = repo.id,
                release_id = release.id,
                "Failed to notify repository owner of review"
            );
        }
    }
}
