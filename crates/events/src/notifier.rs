//! Review notifications published on the event bus.

use std::sync::Arc;

use addonhub_core::addon::ports::ReviewNotifier;
use addonhub_core::addon::{Release, RepositoryInfo, ReviewState};
use addonhub_core::error::PortError;
use addonhub_core::types::DbId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, PlatformEvent};

/// Published after a release is verified or rejected.
pub const EVENT_RELEASE_REVIEWED: &str = "release.reviewed";

/// Payload of a [`EVENT_RELEASE_REVIEWED`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseReviewed {
    pub repo_id: DbId,
    pub repo_name: String,
    /// User the notification is addressed to.
    pub owner_id: DbId,
    pub release_id: DbId,
    pub tag_name: String,
    pub decision: ReviewState,
    /// Empty unless `decision` is `Rejected`.
    pub rejection_reason: String,
}

impl ReleaseReviewed {
    pub fn new(repo: &RepositoryInfo, release: &Release) -> Self {
        Self {
            repo_id: repo.id,
            repo_name: repo.name.clone(),
            owner_id: repo.owner_id,
            release_id: release.id,
            tag_name: release.tag_name.clone(),
            decision: release.review_state(),
            rejection_reason: release.rejection_reason.clone(),
        }
    }
}

/// [`ReviewNotifier`] that publishes a [`ReleaseReviewed`] event.
///
/// Fails when nobody is subscribed, so the caller can log that the owner
/// will not hear about the review.
pub struct EventBusNotifier {
    bus: Arc<EventBus>,
}

impl EventBusNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ReviewNotifier for EventBusNotifier {
    async fn notify_owner_of_review(
        &self,
        repo: &RepositoryInfo,
        release: &Release,
    ) -> Result<(), PortError> {
        let event = PlatformEvent::new(EVENT_RELEASE_REVIEWED)
            .with_source("release", release.id)
            .with_payload(&ReleaseReviewed::new(repo, release))?;

        if self.bus.publish(event) == 0 {
            return Err(format!("no subscriber for {EVENT_RELEASE_REVIEWED}").into());
        }
        tracing::debug!(
            repo_id = repo.id,
            release_id = release.id,
            owner_id = repo.owner_id,
            "Published review notification"
        );
        Ok(())
    }
}
