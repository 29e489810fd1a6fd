//! Shared configuration for the devlink CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to a resolved `ServiceConfig`. The CLI adds
//! `GlobalOpts`-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devlink_api::{TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

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

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named data-service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named data-service profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Data-service root URL (e.g., "https://data.example.com").
    pub url: String,

    /// Database service name under `/api/v2/`.
    #[serde(default = "default_service")]
    pub service: String,

    /// Device table name.
    #[serde(default = "default_device_resource")]
    pub device_resource: String,

    /// Device-group table name.
    #[serde(default = "default_group_resource")]
    pub group_resource: String,

    /// User-to-group link table name.
    #[serde(default = "default_link_resource")]
    pub link_resource: String,

    /// API key (plaintext — prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Default user id for operations that omit one.
    pub user_id: Option<i64>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

fn default_service() -> String {
    "db".into()
}
fn default_device_resource() -> String {
    "device".into()
}
fn default_group_resource() -> String {
    "device_group".into()
}
fn default_link_resource() -> String {
    "user_device_group".into()
}

// ── Resolved config ─────────────────────────────────────────────────

/// The three table names an operation targets.
#[derive(Debug, Clone)]
pub struct ResourceNames {
    pub device: String,
    pub group: String,
    pub link: String,
}

/// Fully resolved service configuration, ready to build a client from.
#[derive(Debug)]
pub struct ServiceConfig {
    pub url: url::Url,
    pub service: String,
    pub api_key: SecretString,
    pub resources: ResourceNames,
    pub transport: TransportConfig,
    pub user_id: Option<i64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "devlink", "devlink").map_or_else(
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
    p.push("devlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DEVLINK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("devlink", &format!("{profile_name}/api-key")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `ServiceConfig` from a profile — no CLI flag overrides.
pub fn profile_to_service_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ServiceConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let api_key = resolve_api_key(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(30));

    Ok(ServiceConfig {
        url,
        service: profile.service.clone(),
        api_key,
        resources: ResourceNames {
            device: profile.device_resource.clone(),
            group: profile.group_resource.clone(),
            link: profile.link_resource.clone(),
        },
        transport: TransportConfig { tls, timeout },
        user_id: profile.user_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::providers::{Format, Toml};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_has_default_profile() {
        let cfg = Config::default();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_parses_with_resource_defaults() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                default_profile = "lab"

                [profiles.lab]
                url = "https://data.example.com"
                api_key = "plain"
                user_id = 7
                "#,
            ))
            .extract()
            .unwrap();

        let profile = &cfg.profiles["lab"];
        assert_eq!(profile.service, "db");
        assert_eq!(profile.device_resource, "device");
        assert_eq!(profile.group_resource, "device_group");
        assert_eq!(profile.link_resource, "user_device_group");
        assert_eq!(profile.user_id, Some(7));
    }

    #[test]
    fn resolve_falls_back_to_plaintext_key() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [profiles.lab]
                url = "https://data.example.com"
                service = "mongo"
                api_key = "plain-key"
                "#,
            ))
            .extract()
            .unwrap();

        let resolved = profile_to_service_config(&cfg.profiles["lab"], "lab").unwrap();
        assert_eq!(resolved.service, "mongo");
        assert_eq!(resolved.url.as_str(), "https://data.example.com/");
        assert!(resolved.user_id.is_none());
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [profiles.lab]
                url = "https://data.example.com"
                "#,
            ))
            .extract()
            .unwrap();

        let result = profile_to_service_config(&cfg.profiles["lab"], "lab");
        assert!(matches!(result, Err(ConfigError::NoCredentials { .. })));
    }
}
