//! Configuration loader
//!
//! Loads [`ClientConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one exists
//! 2. Attempts to load from `CALLWIRE_*` environment variables
//! 3. If the credentials are not in the environment, falls back to a file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! Every entry point validates the result before returning it.
//!
//! ## Environment Variables
//! Required:
//! - `CALLWIRE_CLIENT_ID`, `CALLWIRE_CLIENT_SECRET`: OAuth client credentials
//!
//! Optional (defaults from [`ClientConfig::default`]):
//! - `CALLWIRE_ACCOUNT_ID`: switches to the account-credentials grant
//! - `CALLWIRE_BASE_URL`, `CALLWIRE_TOKEN_URL`, `CALLWIRE_TIMEOUT_SECS`
//! - `CALLWIRE_SCOPES`: space-separated scope list
//! - `CALLWIRE_MAX_ATTEMPTS`, `CALLWIRE_BASE_DELAY_MS`, `CALLWIRE_MAX_DELAY_MS`,
//!   `CALLWIRE_DEADLINE_SECS`, `CALLWIRE_RETRY_NON_IDEMPOTENT`
//! - `CALLWIRE_TOKEN_SKEW_SECS`, `CALLWIRE_MAX_PAGES`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./callwire.toml`, `./callwire.json`, `./config.toml`, `./config.json`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use callwire_domain::config::{ClientConfig, OAuthGrant};
use callwire_domain::{CallwireError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["callwire.toml", "callwire.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns [`CallwireError::Config`] if no source yields a valid
/// configuration.
pub fn load() -> Result<ClientConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `CALLWIRE_*` environment variables
///
/// # Errors
/// Returns [`CallwireError::Config`] if the client credentials are missing,
/// a numeric variable does not parse, or the result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    config.oauth.client_id = env_var("CALLWIRE_CLIENT_ID")?;
    config.oauth.client_secret = env_var("CALLWIRE_CLIENT_SECRET")?;
    if let Some(account_id) = env_opt("CALLWIRE_ACCOUNT_ID") {
        config.oauth.grant = OAuthGrant::AccountCredentials { account_id };
    }
    if let Some(scopes) = env_opt("CALLWIRE_SCOPES") {
        config.oauth.scopes = scopes.split_whitespace().map(String::from).collect();
    }
    if let Some(url) = env_opt("CALLWIRE_TOKEN_URL") {
        config.oauth.token_url = url;
    }

    if let Some(url) = env_opt("CALLWIRE_BASE_URL") {
        config.api.base_url = url;
    }
    set_parsed(&mut config.api.timeout_secs, "CALLWIRE_TIMEOUT_SECS")?;

    set_parsed(&mut config.retry.max_attempts, "CALLWIRE_MAX_ATTEMPTS")?;
    set_parsed(&mut config.retry.base_delay_ms, "CALLWIRE_BASE_DELAY_MS")?;
    set_parsed(&mut config.retry.max_delay_ms, "CALLWIRE_MAX_DELAY_MS")?;
    set_parsed(&mut config.retry.deadline_secs, "CALLWIRE_DEADLINE_SECS")?;
    config.retry.retry_non_idempotent =
        env_bool("CALLWIRE_RETRY_NON_IDEMPOTENT", config.retry.retry_non_idempotent);

    set_parsed(&mut config.token.expiry_skew_secs, "CALLWIRE_TOKEN_SKEW_SECS")?;
    set_parsed(&mut config.pagination.max_pages, "CALLWIRE_MAX_PAGES")?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is chosen by
/// extension (`.toml` or `.json`); sections left out of the file keep their
/// defaults.
///
/// # Errors
/// Returns [`CallwireError::Config`] if the file is missing, unreadable,
/// malformed, or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CallwireError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CallwireError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CallwireError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CallwireError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CallwireError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CallwireError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| CallwireError::Config(format!("Missing required environment variable: {key}")))
}

/// Non-empty value of `key`.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn set_parsed<T>(target: &mut T, key: &str) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_opt(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| CallwireError::Config(format!("Invalid value for {key}: {e}")))?;
    }
    Ok(())
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 7] = [
        "CALLWIRE_CLIENT_ID",
        "CALLWIRE_CLIENT_SECRET",
        "CALLWIRE_ACCOUNT_ID",
        "CALLWIRE_SCOPES",
        "CALLWIRE_MAX_ATTEMPTS",
        "CALLWIRE_RETRY_NON_IDEMPOTENT",
        "CALLWIRE_MAX_PAGES",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("CALLWIRE_TEST_BOOL_ON", "ON");
        std::env::set_var("CALLWIRE_TEST_BOOL_OFF", "off");
        assert!(env_bool("CALLWIRE_TEST_BOOL_ON", false));
        assert!(!env_bool("CALLWIRE_TEST_BOOL_OFF", true));

        std::env::remove_var("CALLWIRE_TEST_BOOL_MISSING");
        assert!(env_bool("CALLWIRE_TEST_BOOL_MISSING", true));

        std::env::remove_var("CALLWIRE_TEST_BOOL_ON");
        std::env::remove_var("CALLWIRE_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CALLWIRE_CLIENT_ID", "client");
        std::env::set_var("CALLWIRE_CLIENT_SECRET", "secret");
        std::env::set_var("CALLWIRE_ACCOUNT_ID", "acct-1");
        std::env::set_var("CALLWIRE_SCOPES", "user:read report:read");
        std::env::set_var("CALLWIRE_MAX_ATTEMPTS", "3");
        std::env::set_var("CALLWIRE_RETRY_NON_IDEMPOTENT", "false");
        std::env::set_var("CALLWIRE_MAX_PAGES", "25");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config should load from env");
        assert_eq!(config.oauth.client_id, "client");
        assert_eq!(config.oauth.grant, OAuthGrant::AccountCredentials { account_id: "acct-1".into() });
        assert_eq!(config.oauth.scopes, vec!["user:read".to_string(), "report:read".to_string()]);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.retry.retry_non_idempotent);
        assert_eq!(config.pagination.max_pages, 25);
        assert_eq!(config.retry.base_delay_ms, 500);
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CALLWIRE_CLIENT_ID", "client");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(CallwireError::Config(msg)) if msg.contains("CALLWIRE_CLIENT_SECRET")));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CALLWIRE_CLIENT_ID", "client");
        std::env::set_var("CALLWIRE_CLIENT_SECRET", "secret");
        std::env::set_var("CALLWIRE_MAX_ATTEMPTS", "many");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(CallwireError::Config(msg)) if msg.contains("CALLWIRE_MAX_ATTEMPTS")));
    }

    #[test]
    fn test_parse_config_rejects_unknown_extension() {
        let result = parse_config("", Path::new("callwire.yaml"));
        assert!(matches!(result, Err(CallwireError::Config(_))));
    }

    #[test]
    fn test_parse_config_toml_keeps_defaults() {
        let config = parse_config(
            "[oauth]\nclient_id = \"a\"\nclient_secret = \"b\"\n\n[retry]\nmax_attempts = 2\n",
            Path::new("callwire.toml"),
        )
        .expect("toml should parse");

        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.max_delay_ms, 30_000);
        assert_eq!(config.oauth.grant, OAuthGrant::ClientCredentials);
    }
}
