//! Well-known role name constants.
//!
//! These must match the seed data in `20240101000001_create_roles.sql`.

/// Only this role may verify or reject add-on releases.
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PUBLISHER: &str = "publisher";
