//! Writes review notifications for repository owners.
//!
//! [`NotificationPersistence`] subscribes to the bus and turns every
//! `release.reviewed` event into a row in `notifications`. Other events are
//! ignored. It runs as a long-lived background task.

use addonhub_core::addon::ReviewState;
use addonhub_core::types::DbId;
use addonhub_db::models::notification::{CreateNotification, KIND_RELEASE_REVIEWED};
use addonhub_db::repositories::NotificationRepo;
use addonhub_db::DbPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;
use crate::notifier::{ReleaseReviewed, EVENT_RELEASE_REVIEWED};

pub struct NotificationPersistence;

impl NotificationPersistence {
    /// Run until the bus is dropped or `cancel` fires.
    pub async fn run(
        pool: DbPool,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification persistence cancelled");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) if event.is(EVENT_RELEASE_REVIEWED) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            source_entity_id = ?event.source_entity_id,
                            "Failed to persist review notification"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Notification persistence lagged, some owners were not notified"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        let reviewed: ReleaseReviewed = event
            .payload_as()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let id = NotificationRepo::create(pool, &notification_for(&reviewed)).await?;
        tracing::info!(
            notification_id = id,
            user_id = reviewed.owner_id,
            release_id = reviewed.release_id,
            "Review notification stored"
        );
        Ok(id)
    }
}

/// The notification row telling an owner how their release was reviewed.
pub fn notification_for(reviewed: &ReleaseReviewed) -> CreateNotification {
    let message = match reviewed.decision {
        ReviewState::Verified => format!(
            "Release {} of {} was verified and is now published.",
            reviewed.tag_name, reviewed.repo_name
        ),
        ReviewState::Rejected => format!(
            "Release {} of {} was rejected: {}",
            reviewed.tag_name, reviewed.repo_name, reviewed.rejection_reason
        ),
        ReviewState::Pending => format!(
            "Release {} of {} is awaiting review.",
            reviewed.tag_name, reviewed.repo_name
        ),
    };
    CreateNotification {
        user_id: reviewed.owner_id,
        kind: KIND_RELEASE_REVIEWED.to_string(),
        repo_id: Some(reviewed.repo_id),
        release_id: Some(reviewed.release_id),
        message,
    }
}
