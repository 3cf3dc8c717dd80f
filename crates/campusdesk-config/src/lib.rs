//! Shared configuration for the campusdesk CLI and TUI.
//!
//! TOML profiles, bearer-token storage (keyring + env + plaintext) and
//! translation to `campusdesk_core::ControllerConfig`. The CLI layers its
//! global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use campusdesk_core::ControllerConfig;
use campusdesk_core::table::DEFAULT_PAGE_SIZE;

/// Keyring service name; entries are keyed `{profile}/token`.
pub const KEYRING_SERVICE: &str = "campusdesk";

/// Prefix for environment overrides (`CAMPUSDESK_DEFAULTS__TIMEOUT=10`).
pub const ENV_PREFIX: &str = "CAMPUSDESK_";

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no token stored for profile '{profile}'; run `campusdesk login`")]
    NoToken { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            page_size: default_page_size(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL; the production backend when unset.
    pub api_url: Option<String>,

    /// Email of the last successful login.
    pub email: Option<String>,

    /// Bearer token (plaintext; prefer the keyring or `token_env`).
    pub token: Option<String>,

    /// Environment variable holding the token.
    pub token_env: Option<String>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override table page size.
    pub page_size: Option<usize>,
}

impl Config {
    /// Profile name to use: explicit override, then `default_profile`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Profile by name, or an empty one (production URL, no token).
    pub fn profile_or_default(&self, name: &str) -> Profile {
        self.profile(name).cloned().unwrap_or_default()
    }

    pub fn profile_mut(&mut self, name: &str) -> &mut Profile {
        self.profiles.entry(name.to_owned()).or_default()
    }

    pub fn page_size(&self, profile: &Profile) -> usize {
        profile.page_size.unwrap_or(self.defaults.page_size).max(1)
    }

    pub fn timeout(&self, profile: &Profile) -> Duration {
        Duration::from_secs(profile.timeout.unwrap_or(self.defaults.timeout))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "campusdesk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("campusdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults → `path` → `CAMPUSDESK_` environment. A missing file is
/// not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token storage ───────────────────────────────────────────────────

fn token_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Resolve the bearer token: keyring, then `token_env`, then plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. System keyring
    if let Ok(secret) = token_entry(profile_name)
        .and_then(|e| e.get_password().map_err(ConfigError::from))
    {
        return Some(SecretString::from(secret));
    }

    // 2. Profile's token_env → env var lookup
    if let Some(val) = profile
        .token_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Some(SecretString::from(val));
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Like [`resolve_token`] but an absent token is an error.
pub fn require_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token(profile, profile_name).ok_or_else(|| ConfigError::NoToken {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    token_entry(profile_name)?.set_password(token.expose_secret())?;
    debug!(profile = profile_name, "token stored in keyring");
    Ok(())
}

/// Remove a stored token. Returns whether one was present.
pub fn clear_token(profile_name: &str) -> Result<bool, ConfigError> {
    match token_entry(profile_name)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile, without CLI overrides.
pub fn profile_to_controller_config(
    cfg: &Config,
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let base = match profile.api_url.as_deref() {
        Some(url) => ControllerConfig::new(url),
        None => ControllerConfig::production(),
    }
    .map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: e.to_string(),
    })?;

    Ok(base
        .with_token(resolve_token(profile, profile_name))
        .with_timeout(cfg.timeout(profile)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.page_size = 25;
        let profile = cfg.profile_mut("staging");
        profile.api_url = Some("http://localhost:8000/api/".into());
        profile.email = Some("admin@aau.edu.et".into());
        profile.timeout = Some(5);
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        let staging = loaded.profile("staging").unwrap();
        assert_eq!(loaded.timeout(staging), Duration::from_secs(5));
        assert_eq!(loaded.page_size(staging), 25);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some(DEFAULT_PROFILE));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.page_size, DEFAULT_PAGE_SIZE);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn active_profile_precedence() {
        let mut cfg = Config::default();
        assert_eq!(cfg.active_profile_name(None), "default");
        cfg.default_profile = Some("prod".into());
        assert_eq!(cfg.active_profile_name(None), "prod");
        assert_eq!(cfg.active_profile_name(Some("dev")), "dev");
    }

    #[test]
    fn plaintext_token_is_last_resort() {
        let profile = Profile {
            token: Some("plain-tok".into()),
            token_env: Some("CAMPUSDESK_TEST_TOKEN_THAT_IS_NOT_SET".into()),
            ..Profile::default()
        };
        // The keyring has no entry for this throwaway profile name.
        let token = resolve_token(&profile, "campusdesk-config-test-profile").unwrap();
        assert_eq!(token.expose_secret(), "plain-tok");
    }

    #[test]
    fn controller_config_from_profile() {
        let cfg = Config::default();
        let profile = Profile {
            api_url: Some("http://localhost:8000/api/".into()),
            timeout: Some(7),
            ..Profile::default()
        };
        let cc = profile_to_controller_config(&cfg, &profile, "cfg-test-none").unwrap();
        assert_eq!(cc.api_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(cc.timeout, Duration::from_secs(7));

        let bad = Profile {
            api_url: Some("nope".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_controller_config(&cfg, &bad, "x"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
