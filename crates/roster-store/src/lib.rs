//! Roster Store - SQLite persistence for project edits
//!
//! Provides:
//! - SQLite schema with an embedded, checksummed migrations framework
//! - Repository functions for projects, transactions, edges and feed stories
//! - `SqliteBackend`, committing a whole edit in one SQLite transaction
//! - `SqliteFeedPublisher`, persisting feed stories
//! - `StoreConfig`, connection settings loaded from TOML

pub mod backend;
pub mod config;
pub mod db;
pub mod errors;
pub mod feed;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use backend::SqliteBackend;
pub use config::StoreConfig;
pub use errors::Result;
pub use feed::SqliteFeedPublisher;
