//! In-process events for the add-on registry.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the event envelope.
//! - [`EventBusNotifier`]: the review-notification port, publishing
//!   `release.reviewed` events.
//! - [`NotificationPersistence`]: background task turning review events
//!   into notifications for repository owners.

pub mod bus;
pub mod notifier;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use notifier::{EventBusNotifier, ReleaseReviewed, EVENT_RELEASE_REVIEWED};
pub use persistence::NotificationPersistence;
