//! Integration tests for configuration loader
//!
//! Exercises the layered load: file, then environment, then token file.

use std::sync::Mutex;

use octotriage_infra::config;
use once_cell::sync::Lazy;
use tempfile::TempDir;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const VARS: [&str; 10] = [
    "OCTOBOX_URL",
    "OCTOBOX_API_TOKEN",
    "OCTOTRIAGE_DATA_DIR",
    "OCTOBOX_TUI_DATA_DIR",
    "OCTOTRIAGE_CONFIG",
    "OCTOTRIAGE_CACHE_TTL_SECS",
    "OCTOTRIAGE_DB_POOL_SIZE",
    "OCTOTRIAGE_DEBUG",
    "OCTOBOX_TUI_DEBUG",
    "OCTOTRIAGE_LOG_FORMAT",
];

fn clear_env() {
    for key in VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn data_dir_config_is_overridden_by_environment() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();
    let dir = TempDir::new().expect("temp dir");

    std::fs::write(
        dir.path().join("config.toml"),
        r#"
[remote]
base_url = "https://file.example.com"
page_size = 25

[sync]
cache_ttl_secs = 120
"#,
    )
    .expect("write config");

    std::env::set_var("OCTOTRIAGE_DATA_DIR", dir.path());
    std::env::set_var("OCTOBOX_URL", "https://env.example.com/");
    std::env::set_var("OCTOBOX_API_TOKEN", "env-token");

    let loaded = config::load();
    clear_env();
    let loaded = loaded.expect("config");

    assert_eq!(loaded.data_dir, dir.path());
    assert_eq!(loaded.remote.base_url, "https://env.example.com");
    assert_eq!(loaded.remote.page_size, 25);
    assert_eq!(loaded.sync.cache_ttl_secs, 120);
    assert_eq!(loaded.remote.api_token.as_deref(), Some("env-token"));
    assert_eq!(loaded.database_path(), dir.path().join("cache.db"));
}

#[test]
fn token_file_fills_missing_token() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();
    let dir = TempDir::new().expect("temp dir");
    config::save_token(dir.path(), "file-token").expect("save");

    std::env::set_var("OCTOBOX_TUI_DATA_DIR", dir.path());
    let loaded = config::load();
    clear_env();
    let loaded = loaded.expect("config");

    assert!(loaded.has_token());
    assert_eq!(loaded.remote.api_token.as_deref(), Some("file-token"));
}

#[test]
fn explicit_json_config_is_used() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("custom.json");
    std::fs::write(&path, r#"{"sync": {"poll_max_attempts": 0}}"#).expect("write config");

    std::env::set_var("OCTOTRIAGE_DATA_DIR", dir.path());
    std::env::set_var("OCTOTRIAGE_CONFIG", &path);
    let loaded = config::load();
    clear_env();

    // Zero poll attempts fails validation.
    assert!(loaded.is_err());
}
