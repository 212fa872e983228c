// Integration tests for EngineConfig file loading and environment overrides.
// The environment is process-wide, so every test here holds ENV_LOCK.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use roster_core::logging_facility::Profile;
use roster_core::ExErrorKind;
use roster_engine::config::ENV_LOG_PROFILE;
use roster_engine::EngineConfig;
use roster_store::config::ENV_DB_PATH;
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Take the lock and start from a clean environment
fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::remove_var(ENV_DB_PATH);
    std::env::remove_var(ENV_LOG_PROFILE);
    guard
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("roster.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_load_reads_file() {
    let _env = clean_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        log_profile = "production"

        [store]
        path = "data/roster.db"
        busy_timeout_ms = 250
        "#,
    );

    let config = EngineConfig::load(&path).unwrap();

    assert_eq!(config.log_profile, Profile::Production);
    assert_eq!(config.store.path, PathBuf::from("data/roster.db"));
    assert_eq!(config.store.busy_timeout_ms, 250);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let _env = clean_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = EngineConfig::load(&path).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Io);
    assert_eq!(err.op(), Some("config_load"));
    assert_eq!(err.entity_id(), Some(path.display().to_string().as_str()));
}

#[test]
fn test_load_rejects_unknown_key() {
    let _env = clean_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "log_level = \"debug\"\n");

    let err = EngineConfig::load(&path).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_env_overrides_file_values() {
    let _env = clean_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "log_profile = \"development\"\n[store]\npath = \"from-file.db\"\n",
    );

    std::env::set_var(ENV_DB_PATH, ":memory:");
    std::env::set_var(ENV_LOG_PROFILE, "Test");
    let loaded = EngineConfig::load(&path);
    std::env::remove_var(ENV_DB_PATH);
    std::env::remove_var(ENV_LOG_PROFILE);

    let config = loaded.unwrap();
    assert!(config.store.is_in_memory());
    assert_eq!(config.log_profile, Profile::Test);
    assert!(config.open_store().is_ok());
}

#[test]
fn test_db_path_override_alone_keeps_file_profile() {
    let _env = clean_env();

    std::env::set_var(ENV_DB_PATH, "/tmp/roster-env.db");
    let overridden = EngineConfig::from_toml_str("log_profile = \"production\"")
        .unwrap()
        .with_env_overrides();
    std::env::remove_var(ENV_DB_PATH);

    let config = overridden.unwrap();
    assert_eq!(config.store.path, PathBuf::from("/tmp/roster-env.db"));
    assert_eq!(config.log_profile, Profile::Production);
}

#[test]
fn test_unknown_env_profile_is_invalid_input() {
    let _env = clean_env();

    std::env::set_var(ENV_LOG_PROFILE, "verbose");
    let result = EngineConfig::default().with_env_overrides();
    std::env::remove_var(ENV_LOG_PROFILE);

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert!(err.message().contains("verbose"));
}
