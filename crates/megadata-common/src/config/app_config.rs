//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional
//! `megadata.toml` file.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Backend API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    pub timeout_secs: u64,
    pub health_timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Join a request path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Where the signed-in session is persisted
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    pub json: bool,
}

/// Raw overrides, from the environment or a config file
///
/// Keys mirror the `MEGADATA_*` variables without the prefix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
    pub api_url: Option<String>,
    pub api_timeout_secs: Option<u64>,
    pub health_timeout_secs: Option<u64>,
    pub session_file: Option<PathBuf>,
    pub log_json: Option<bool>,
}

// Default value functions
fn default_app_name() -> String {
    "megadata".to_string()
}

fn default_api_url(env: Environment) -> String {
    if env.is_production() {
        "https://mega-data-backend.onrender.com".to_string()
    } else {
        "http://localhost:5000".to_string()
    }
}

fn default_api_timeout() -> u64 {
    15
}

fn default_health_timeout() -> u64 {
    5
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".megadata/session.json")
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable holds an unparseable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let layer = ConfigLayer {
            api_url: env::var("MEGADATA_API_URL").ok(),
            api_timeout_secs: parse_var("MEGADATA_API_TIMEOUT_SECS")?,
            health_timeout_secs: parse_var("MEGADATA_HEALTH_TIMEOUT_SECS")?,
            session_file: env::var("MEGADATA_SESSION_FILE").ok().map(PathBuf::from),
            log_json: parse_var("MEGADATA_LOG_JSON")?,
        };
        Self::from_layer(app_settings_from_env(), layer)
    }

    /// Load `megadata.toml` (optional) with `MEGADATA_*` variables on top
    ///
    /// # Errors
    /// Returns an error if the file is malformed or a value has the wrong type
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let layer: ConfigLayer = config::Config::builder()
            .add_source(config::File::with_name("megadata").required(false))
            .add_source(config::Environment::with_prefix("MEGADATA").try_parsing(true))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Source(e.to_string()))?;

        Self::from_layer(app_settings_from_env(), layer)
    }

    /// Apply defaults to whatever the layer leaves unset
    pub fn from_layer(app: AppSettings, layer: ConfigLayer) -> Result<Self, ConfigError> {
        let base_url = layer
            .api_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_api_url(app.env));
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("MEGADATA_API_URL", base_url));
        }

        let timeout_secs = layer.api_timeout_secs.unwrap_or_else(default_api_timeout);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "MEGADATA_API_TIMEOUT_SECS",
                timeout_secs.to_string(),
            ));
        }

        Ok(Self {
            app,
            api: ApiConfig {
                base_url: base_url.trim().trim_end_matches('/').to_string(),
                timeout_secs,
                health_timeout_secs: layer
                    .health_timeout_secs
                    .unwrap_or_else(default_health_timeout),
            },
            session: SessionConfig {
                file: layer.session_file.unwrap_or_else(default_session_file),
            },
            log: LogConfig {
                json: layer.log_json.unwrap_or(false),
            },
        })
    }
}

fn app_settings_from_env() -> AppSettings {
    AppSettings {
        name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
        env: env::var("APP_ENV")
            .ok()
            .and_then(|s| Environment::parse(&s))
            .unwrap_or_default(),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Configuration source error: {0}")]
    Source(String),
}
