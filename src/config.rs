//! Dashboard Configuration
//!
//! Backend URL, storage location, UI timings and logging, read from a TOML
//! file and then overridden by `TIMEBOT_*` environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by both binaries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scheduler backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Absent means requests wait indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://time-bot-backend-2.onrender.com/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Client-side persistent storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    dirs::data_local_dir()
        .map(|p| {
            p.join("timebot-admin")
                .join("storage.json")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./timebot_storage.json".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Storage path with a leading `~/` expanded to the home directory
    pub fn resolved_path(&self) -> PathBuf {
        match (self.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.path),
        }
    }
}

/// Timings for transient UI effects
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,

    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,

    #[serde(default = "default_carousel_interval_ms")]
    pub carousel_interval_ms: u64,
}

fn default_notification_ms() -> u64 {
    2500
}

fn default_redirect_delay_ms() -> u64 {
    1500
}

fn default_carousel_interval_ms() -> u64 {
    4000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ms: default_notification_ms(),
            redirect_delay_ms: default_redirect_delay_ms(),
            carousel_interval_ms: default_carousel_interval_ms(),
        }
    }
}

impl UiConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_interval_ms)
    }
}

/// Log level, output format and optional log file
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
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
            file: None,
        }
    }
}

impl Config {
    /// Parse a TOML file without environment overrides
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

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Parse a TOML file, then apply environment overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First readable file from the search path, else defaults; env always applies
    pub fn load_default() -> Self {
        let search_path = [
            dirs::config_dir().map(|p| p.join("timebot-admin").join("config.toml")),
            Some(PathBuf::from("/etc/timebot-admin/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in search_path.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TIMEBOT_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("TIMEBOT_API_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.api.request_timeout_secs = Some(s);
            }
        }

        if let Some(path) = lookup("TIMEBOT_STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Some(level) = lookup("TIMEBOT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TIMEBOT_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(file) = lookup("TIMEBOT_LOG_FILE") {
            self.logging.file = Some(file);
        }
    }
}

/// Config file could not be read or parsed
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Annotated config file with every default spelled out
pub fn generate_default_config() -> String {
    r#"# Timebot Admin Configuration
#
# Environment variables override these settings:
# - TIMEBOT_API_URL
# - TIMEBOT_API_TIMEOUT_SECS
# - TIMEBOT_STORAGE_PATH
# - TIMEBOT_LOG_LEVEL
# - TIMEBOT_LOG_FORMAT
# - TIMEBOT_LOG_FILE

[api]
# Scheduler backend base URL (admin, appointment and chat routes live below it)
base_url = "https://time-bot-backend-2.onrender.com/api"

# Request timeout in seconds (omit to wait indefinitely)
# request_timeout_secs = 30

[storage]
# File holding the session, auth token and chat transcript
path = "~/.local/share/timebot-admin/storage.json"

[ui]
# How long notifications stay visible (ms)
notification_ms = 2500

# Delay between a successful login and the dashboard (ms)
redirect_delay_ms = 1500

# Dashboard feature carousel rotation (ms)
carousel_interval_ms = 4000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path (keeps the terminal dashboard clean)
# file = "/tmp/timebot-admin.log"
"#
    .to_string()
}
