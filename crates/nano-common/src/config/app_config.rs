//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when one
//! is present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use nano_core::Intents;
use serde::Deserialize;

/// Production REST base
pub const STANDARD_API: &str = "https://api.sgroup.qq.com";
/// Sandbox REST base
pub const SANDBOX_API: &str = "https://sandbox.api.sgroup.qq.com";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub bot: BotConfig,
    pub gateway: GatewayConfig,
    pub log: LogConfig,
    pub storage: StorageConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
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
}

/// Bot credentials and identity settings
#[derive(Clone)]
pub struct BotConfig {
    pub app_id: String,
    pub token: String,
    pub secret: String,
    pub super_users: Vec<String>,
    pub intents: Intents,
    pub sandbox: bool,
    pub api_timeout: Duration,
    pub shard_index: u32,
    /// 0 asks the gateway for the recommended shard count
    pub shard_count: u32,
}

impl BotConfig {
    /// Minimal config for the given credentials, everything else defaulted
    pub fn new(app_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            token: token.into(),
            secret: String::new(),
            super_users: Vec::new(),
            intents: Intents::default(),
            sandbox: false,
            api_timeout: Duration::from_millis(default_api_timeout_ms()),
            shard_index: 0,
            shard_count: 0,
        }
    }

    /// Value of the `Authorization` header: `Bot {app_id}.{token}`
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bot {}.{}", self.app_id, self.token)
    }

    /// REST base for the configured environment
    #[must_use]
    pub fn api_base(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_API
        } else {
            STANDARD_API
        }
    }

    #[must_use]
    pub fn is_super_user(&self, user_id: &str) -> bool {
        self.super_users.iter().any(|u| u == user_id)
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("app_id", &self.app_id)
            .field("token", &"<redacted>")
            .field("super_users", &self.super_users)
            .field("intents", &self.intents)
            .field("sandbox", &self.sandbox)
            .field("api_timeout", &self.api_timeout)
            .field("shard_index", &self.shard_index)
            .field("shard_count", &self.shard_count)
            .finish()
    }
}

/// Gateway session timing
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub connect_retry_ms: u64,
    pub resume_retry_ms: u64,
    pub heartbeat_poll_ms: u64,
}

impl GatewayConfig {
    #[must_use]
    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    #[must_use]
    pub fn resume_retry(&self) -> Duration {
        Duration::from_millis(self.resume_retry_ms)
    }

    #[must_use]
    pub fn heartbeat_poll(&self) -> Duration {
        Duration::from_millis(self.heartbeat_poll_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            connect_retry_ms: default_connect_retry_ms(),
            resume_retry_ms: default_resume_retry_ms(),
            heartbeat_poll_ms: default_heartbeat_poll_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

/// Per-service data folders
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

// Default value functions
fn default_app_name() -> String {
    "nano-bot".to_string()
}

fn default_api_timeout_ms() -> u64 {
    10_000
}

fn default_connect_retry_ms() -> u64 {
    2_000
}

fn default_resume_retry_ms() -> u64 {
    1_000
}

fn default_heartbeat_poll_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        let intents = match var("BOT_INTENTS") {
            Some(raw) => raw
                .parse::<Intents>()
                .map_err(|e| ConfigError::InvalidValue("BOT_INTENTS", e.to_string()))?,
            None => Intents::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: var("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            bot: BotConfig {
                app_id: var("BOT_APP_ID").ok_or(ConfigError::MissingVar("BOT_APP_ID"))?,
                token: var("BOT_TOKEN").ok_or(ConfigError::MissingVar("BOT_TOKEN"))?,
                secret: var("BOT_SECRET").unwrap_or_default(),
                super_users: var("BOT_SUPER_USERS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|u| !u.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
                intents,
                sandbox: parse_bool("BOT_SANDBOX", var("BOT_SANDBOX"))?.unwrap_or(false),
                api_timeout: Duration::from_millis(
                    parse_num("BOT_API_TIMEOUT_MS", var("BOT_API_TIMEOUT_MS"))?
                        .unwrap_or_else(default_api_timeout_ms),
                ),
                shard_index: parse_num("BOT_SHARD_INDEX", var("BOT_SHARD_INDEX"))?.unwrap_or(0),
                shard_count: parse_num("BOT_SHARD_COUNT", var("BOT_SHARD_COUNT"))?.unwrap_or(0),
            },
            gateway: GatewayConfig {
                connect_retry_ms: parse_num(
                    "GATEWAY_CONNECT_RETRY_MS",
                    var("GATEWAY_CONNECT_RETRY_MS"),
                )?
                .unwrap_or_else(default_connect_retry_ms),
                resume_retry_ms: parse_num("GATEWAY_RESUME_RETRY_MS", var("GATEWAY_RESUME_RETRY_MS"))?
                    .unwrap_or_else(default_resume_retry_ms),
                heartbeat_poll_ms: parse_num(
                    "GATEWAY_HEARTBEAT_POLL_MS",
                    var("GATEWAY_HEARTBEAT_POLL_MS"),
                )?
                .unwrap_or_else(default_heartbeat_poll_ms),
            },
            log: LogConfig {
                level: var("LOG_LEVEL").unwrap_or_else(default_log_level),
                json: parse_bool("LOG_JSON", var("LOG_JSON"))?.unwrap_or(false),
            },
            storage: StorageConfig {
                data_dir: var("DATA_DIR").map_or_else(default_data_dir, PathBuf::from),
            },
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
) -> Result<Option<T>, ConfigError> {
    raw.map(|s| {
        s.trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key, s))
    })
    .transpose()
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    raw.map(|s| match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, s)),
    })
    .transpose()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
