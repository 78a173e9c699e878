//! Add-on registry domain logic.
//!
//! Turns verified repository releases into published add-on records and
//! renders them into the S-expression index consumed by the game client.
//! This crate never talks to the database directly: storage, version
//! control, archive generation and notifications are reached through the
//! traits in [`addon::ports`].

pub mod addon;
pub mod config;
pub mod error;
pub mod hashing;
pub mod roles;
pub mod types;
