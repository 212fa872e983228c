//! Engine configuration
//!
//! ```toml
//! log_profile = "production"
//!
//! [store]
//! path = "/var/lib/roster/roster.db"
//! busy_timeout_ms = 2000
//! ```
//!
//! `ROSTER_DB_PATH` and `ROSTER_LOG_PROFILE` override the file.

use std::path::Path;

use roster_core::errors::{ExError, ExErrorKind};
use roster_core::logging_facility::{self, Profile};
use roster_store::errors::{config_error, Result};
use roster_store::{db, StoreConfig};
use rusqlite::Connection;
use serde::Deserialize;

/// Environment variable overriding [`EngineConfig::log_profile`]
pub const ENV_LOG_PROFILE: &str = "ROSTER_LOG_PROFILE";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub log_profile: Profile,
}

impl EngineConfig {
    /// # Errors
    ///
    /// `InvalidInput` when the TOML is malformed or has unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| config_error(e.to_string()))
    }

    /// Read `path`, then apply environment overrides
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidInput` if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("config_load")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&raw)?.with_env_overrides()
    }

    /// Apply `ROSTER_DB_PATH` and `ROSTER_LOG_PROFILE` if set
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an unrecognised profile name.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.store = self.store.with_env_overrides();
        if let Ok(raw) = std::env::var(ENV_LOG_PROFILE) {
            self.log_profile = parse_profile(&raw)?;
        }
        Ok(self)
    }

    /// Install the global subscriber for the configured profile
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }

    /// Open, configure and migrate the configured database
    ///
    /// # Errors
    ///
    /// `Persistence` if the database cannot be opened or migrated.
    pub fn open_store(&self) -> Result<Connection> {
        db::open_with(&self.store)
    }
}

fn parse_profile(raw: &str) -> Result<Profile> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "development" => Ok(Profile::Development),
        "production" => Ok(Profile::Production),
        "test" => Ok(Profile::Test),
        other => Err(config_error(format!("unknown log profile '{}'", other))),
    }
}
