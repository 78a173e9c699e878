//! Renders pages of the public add-on index from the database.

pub mod config;
pub mod index;

pub use config::IndexerConfig;
pub use index::render_page;
