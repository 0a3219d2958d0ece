//! Configuration loader
//!
//! Builds the application [`Config`] from layered sources.
//!
//! ## Loading Strategy
//! 1. Defaults from [`Config::default`]
//! 2. An optional config file (TOML or JSON, detected by extension)
//! 3. Environment variables, which always win over the file
//! 4. The token file in the data directory, when no token is set yet
//!
//! ## Environment Variables
//! - `OCTOBOX_URL`: Octobox base url (trailing `/` trimmed)
//! - `OCTOBOX_API_TOKEN`: API token
//! - `OCTOTRIAGE_DATA_DIR` (or `OCTOBOX_TUI_DATA_DIR`): data directory
//! - `OCTOTRIAGE_CONFIG`: explicit config file path
//! - `OCTOTRIAGE_CACHE_TTL_SECS`: cache freshness window in seconds
//! - `OCTOTRIAGE_DB_POOL_SIZE`: connection pool size
//! - `OCTOTRIAGE_DEBUG` (or `OCTOBOX_TUI_DEBUG`): debug logging (true/false)
//! - `OCTOTRIAGE_LOG_FORMAT`: `json` for JSON log lines
//!
//! ## File Locations
//! `$OCTOTRIAGE_CONFIG`, then `<data_dir>/config.toml`, then
//! `<data_dir>/config.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use octotriage_domain::constants::{DEFAULT_DATA_DIR_NAME, TOKEN_FILE_NAME};
use octotriage_domain::{Config, Result, TriageError};
use url::Url;

use crate::errors::conversions::to_domain;

pub const ENV_BASE_URL: &str = "OCTOBOX_URL";
pub const ENV_API_TOKEN: &str = "OCTOBOX_API_TOKEN";
pub const ENV_DATA_DIR: [&str; 2] = ["OCTOTRIAGE_DATA_DIR", "OCTOBOX_TUI_DATA_DIR"];
pub const ENV_CONFIG_FILE: &str = "OCTOTRIAGE_CONFIG";
pub const ENV_CACHE_TTL: &str = "OCTOTRIAGE_CACHE_TTL_SECS";
pub const ENV_POOL_SIZE: &str = "OCTOTRIAGE_DB_POOL_SIZE";
pub const ENV_DEBUG: [&str; 2] = ["OCTOTRIAGE_DEBUG", "OCTOBOX_TUI_DEBUG"];
pub const ENV_LOG_FORMAT: &str = "OCTOTRIAGE_LOG_FORMAT";

/// Load configuration from every source.
///
/// # Errors
/// Returns `TriageError::Config` if a config file is unreadable or invalid,
/// an environment value does not parse, or validation fails.
pub fn load() -> Result<Config> {
    let data_dir = resolve_data_dir();

    let mut config = match probe_config_paths(&data_dir) {
        Some(path) => load_from_file(Some(path))?,
        None => Config::default(),
    };

    if env_first(&ENV_DATA_DIR).is_some() || config.data_dir == Path::new(DEFAULT_DATA_DIR_NAME) {
        config.data_dir = data_dir;
    }

    apply_env(&mut config)?;

    if !config.has_token() {
        config.remote.api_token = read_token(&config.data_dir)?;
    }

    validate(&config)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        base_url = %config.remote.base_url,
        has_token = config.has_token(),
        "configuration loaded"
    );
    Ok(config)
}

/// Load configuration from defaults and environment variables only.
///
/// # Errors
/// Returns `TriageError::Config` if an environment value does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config { data_dir: resolve_data_dir(), ..Config::default() };
    apply_env(&mut config)?;
    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations under the resolved
/// data directory.
///
/// # Errors
/// Returns `TriageError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TriageError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths(&resolve_data_dir()).ok_or_else(|| {
            TriageError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TriageError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(to_domain),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TriageError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TriageError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file: `$OCTOTRIAGE_CONFIG`, then
/// `config.toml` and `config.json` under `data_dir`.
pub fn probe_config_paths(data_dir: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(explicit) = env_first(&[ENV_CONFIG_FILE]) {
        candidates.push(PathBuf::from(explicit));
    }
    candidates.push(data_dir.join("config.toml"));
    candidates.push(data_dir.join("config.json"));

    candidates.into_iter().find(|path| path.exists())
}

/// Data directory from the environment, else `~/.octotriage`.
pub fn resolve_data_dir() -> PathBuf {
    env_first(&ENV_DATA_DIR).map(PathBuf::from).unwrap_or_else(|| {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR_NAME))
    })
}

/// Read and trim the token file, if present and non-empty.
///
/// # Errors
/// Returns `TriageError::Config` if the file exists but cannot be read.
pub fn read_token(data_dir: &Path) -> Result<Option<String>> {
    let path = data_dir.join(TOKEN_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let token = std::fs::read_to_string(&path)
        .map_err(|e| TriageError::Config(format!("Failed to read {}: {e}", path.display())))?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Persist `token` to `<data_dir>/token`, readable only by the owner on
/// unix. Returns the file path.
///
/// # Errors
/// Returns `TriageError::InvalidInput` for an empty token and an I/O error
/// if the file cannot be written.
pub fn save_token(data_dir: &Path, token: &str) -> Result<PathBuf> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TriageError::InvalidInput("token must not be empty".into()));
    }

    std::fs::create_dir_all(data_dir).map_err(to_domain)?;
    let path = data_dir.join(TOKEN_FILE_NAME);
    std::fs::write(&path, token).map_err(to_domain)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
            .map_err(to_domain)?;
    }

    tracing::info!(path = %path.display(), "api token saved");
    Ok(path)
}

/// Check values that would otherwise fail far from their source.
///
/// # Errors
/// Returns `TriageError::Config` naming the first invalid field.
pub fn validate(config: &Config) -> Result<()> {
    Url::parse(&config.remote.base_url).map_err(|e| {
        TriageError::Config(format!("invalid base url '{}': {e}", config.remote.base_url))
    })?;
    if config.remote.page_size == 0 {
        return Err(TriageError::Config("remote.page_size must be at least 1".into()));
    }
    if config.sync.poll_max_attempts == 0 {
        return Err(TriageError::Config("sync.poll_max_attempts must be at least 1".into()));
    }
    Ok(())
}

fn apply_env(config: &mut Config) -> Result<()> {
    if let Some(url) = env_first(&[ENV_BASE_URL]) {
        config.remote.base_url = url;
    }
    config.remote.base_url = config.remote.base_url.trim_end_matches('/').to_string();

    if let Some(token) = env_first(&[ENV_API_TOKEN]) {
        config.remote.api_token = Some(token);
    }
    if let Some(ttl) = env_parse::<u64>(ENV_CACHE_TTL)? {
        config.sync.cache_ttl_secs = ttl;
    }
    if let Some(pool_size) = env_parse::<u32>(ENV_POOL_SIZE)? {
        config.database.pool_size = pool_size.max(1);
    }
    if ENV_DEBUG.iter().any(|key| env_bool(key, false)) {
        config.logging.level = "debug".to_string();
    }
    if let Some(format) = env_first(&[ENV_LOG_FORMAT]) {
        config.logging.json = format.eq_ignore_ascii_case("json");
    }
    Ok(())
}

/// First non-empty value among `keys`.
fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_first(&[key])
        .map(|raw| {
            raw.parse::<T>().map_err(|e| TriageError::Config(format!("Invalid {key} '{raw}': {e}")))
        })
        .transpose()
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
