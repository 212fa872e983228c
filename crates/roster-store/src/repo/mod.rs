//! Repository layer for persisting project edits to SQLite

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
