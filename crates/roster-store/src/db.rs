//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Apply connection settings from `config`
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    if config.wal && !config.is_in_memory() {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(from_rusqlite)?;
    }

    Ok(())
}

/// Open, configure and migrate the database described by `config`
pub fn open_with(config: &StoreConfig) -> Result<Connection> {
    let mut conn = if config.is_in_memory() {
        open_in_memory()?
    } else {
        open(&config.path)?
    };
    configure(&conn, config)?;
    apply_migrations(&mut conn)?;
    tracing::debug!(path = %config.path.display(), "store opened");
    Ok(conn)
}
