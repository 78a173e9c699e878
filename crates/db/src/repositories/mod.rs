//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod addon_repository_repo;
pub mod notification_repo;
pub mod release_repo;
pub mod repository_repo;
pub mod user_repo;

pub use addon_repository_repo::AddonRepositoryRepo;
pub use notification_repo::NotificationRepo;
pub use release_repo::ReleaseRepo;
pub use repository_repo::RepositoryRepo;
pub use user_repo::UserRepo;
