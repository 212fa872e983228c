//! Roster Engine - Orchestration layer
//!
//! Provides high-level commands that run the project editor against a
//! SQLite connection, plus configuration loading.

pub mod commands;
pub mod config;

pub use config::EngineConfig;
