//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::gateway::normalize_base_url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Left unset, the HTTP client's own defaults apply
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api/".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Session endpoints and the renewal trigger
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_refresh_endpoint")]
    pub refresh_endpoint: String,

    #[serde(default = "default_validate_endpoint")]
    pub validate_endpoint: String,

    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

fn default_refresh_endpoint() -> String {
    "auth/refresh".to_string()
}

fn default_validate_endpoint() -> String {
    "auth/validate".to_string()
}

fn default_retry_statuses() -> Vec<u16> {
    vec![401, 403]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_endpoint: default_refresh_endpoint(),
            validate_endpoint: default_validate_endpoint(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

/// Redirect targets used by the guards
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_landing")]
    pub default_landing: String,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_landing() -> String {
    "/dashboard".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            default_landing: default_landing(),
        }
    }
}

/// Where the email and role claim live between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    #[default]
    File,
    Memory,
}

impl std::str::FromStr for SessionStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(SessionStoreKind::File),
            "memory" => Ok(SessionStoreKind::Memory),
            other => Err(format!("Unknown session store: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub store: SessionStoreKind,

    /// Defaults to `<data dir>/engagex/session.json`
    pub path: Option<String>,
}

impl SessionConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path)
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("engagex").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./engagex_session.json"))
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML text; the base URL is normalised to a trailing `/`
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("engagex").join("config.toml")),
            Some(PathBuf::from("/etc/engagex/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ENGAGEX_API_URL") {
            self.api.base_url = normalize_base_url(&url);
        }

        if let Some(store) = lookup("ENGAGEX_SESSION_STORE") {
            match store.parse() {
                Ok(kind) => self.session.store = kind,
                Err(e) => tracing::warn!("Ignoring ENGAGEX_SESSION_STORE: {}", e),
            }
        }
        if let Some(path) = lookup("ENGAGEX_SESSION_PATH") {
            self.session.path = Some(path);
        }

        if let Some(level) = lookup("ENGAGEX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ENGAGEX_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Engage X Console Configuration
#
# Environment variables override these settings:
# - ENGAGEX_API_URL
# - ENGAGEX_SESSION_STORE
# - ENGAGEX_SESSION_PATH
# - ENGAGEX_LOG_LEVEL
# - ENGAGEX_LOG_FORMAT

[api]
# Backend base URL; endpoint paths are appended to it
base_url = "http://localhost:8080/api/"

# Request timeout in seconds (unset = HTTP client default)
# request_timeout_secs = 30

[auth]
# Called once when a request is rejected, before replaying it
refresh_endpoint = "auth/refresh"

# Probed by the session guard before any protected view
validate_endpoint = "auth/validate"

# Statuses that trigger a session renewal
retry_statuses = [401, 403]

[routes]
login_path = "/login"
default_landing = "/dashboard"

[session]
# Where email and role are kept: file or memory
store = "file"

# Session file location
# path = "~/.local/share/engagex/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
