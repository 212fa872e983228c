//! Store configuration
//!
//! ```toml
//! path = "var/roster.db"
//! busy_timeout_ms = 2000
//! wal = true
//! ```

use serde::Deserialize;
use std::path::PathBuf;

use crate::errors::{config_error, Result};

/// Environment variable overriding [`StoreConfig::path`]
pub const ENV_DB_PATH: &str = "ROSTER_DB_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file; `:memory:` opens a private in-memory database
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    /// Use write-ahead logging
    pub wal: bool,
    pub foreign_keys: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("roster.db"),
            busy_timeout_ms: 5_000,
            wal: true,
            foreign_keys: true,
        }
    }
}

impl StoreConfig {
    /// # Errors
    ///
    /// `InvalidInput` when the TOML is malformed or has unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| config_error(e.to_string()))
    }

    /// Apply `ROSTER_DB_PATH` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            if !path.is_empty() {
                self.path = PathBuf::from(path);
            }
        }
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}
