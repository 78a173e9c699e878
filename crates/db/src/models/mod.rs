//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and, where rows are inserted from Rust, a create DTO. Rows that back
//! a core type convert into it with `From`.

pub mod addon_repository;
pub mod notification;
pub mod release;
pub mod repository;
pub mod user;
