//! Add-on verification, regeneration and index serialization.
//!
//! Control flow: [`review::ReviewService`] gates verification on the
//! administrator check and drives [`regeneration::Regenerator`], which
//! writes the [`model::AddonRecord`]. [`convert::Converter`] reads that
//! record plus live repository attributes into an
//! [`descriptor::AddonDescriptor`], and [`sexp`] renders it for the client.

pub mod convert;
pub mod descriptor;
pub mod eligibility;
pub mod manifest;
pub mod model;
pub mod pagination;
pub mod ports;
pub mod regeneration;
pub mod review;
pub mod screenshots;
pub mod sexp;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

pub use convert::Converter;
pub use descriptor::{AddonDescriptor, AddonType};
pub use model::{Actor, AddonRecord, Release, RepositoryInfo, ReviewState};
pub use regeneration::{RegenerationOutcome, Regenerator};
pub use review::ReviewService;

/// Run `fut` unless `cancel` fires first.
///
/// Cancellation drops the in-flight collaborator call and yields
/// [`CoreError::Cancelled`].
pub(crate) async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Cancelled),
        out = fut => Ok(out),
    }
}
