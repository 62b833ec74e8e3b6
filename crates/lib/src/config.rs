//! Configuration types and loading.
//!
//! Config is a JSON file (default `~/.pushgate/config.json`). It is generated with
//! defaults on first run and then edited by the operator. Once loaded it is passed
//! around as a plain value; nothing here is global.

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP intake settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Host messenger settings (where queued messages are delivered).
    #[serde(default)]
    pub messengers: MessengersConfig,

    /// Delivery queue settings.
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Listener, auth, and recipient settings for the push endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address (default "0.0.0.0").
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Listen port (default 9966).
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Bearer token required on every push. Generated when empty. Overridden by PUSHGATE_TOKEN env.
    #[serde(default)]
    pub token: String,

    /// Recipient used when a request carries no `umo`. Empty means unset.
    #[serde(default)]
    pub default_umo: String,

    /// Route that accepts pushes (default "/send").
    #[serde(default = "default_api_path")]
    pub path: String,
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    9966
}

fn default_api_path() -> String {
    "/send".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            token: String::new(),
            default_umo: String::new(),
            path: default_api_path(),
        }
    }
}

impl ApiConfig {
    /// Configured default recipient, or None when blank.
    pub fn default_recipient(&self) -> Option<&str> {
        let umo = self.default_umo.trim();
        if umo.is_empty() {
            None
        } else {
            Some(umo)
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }

    /// Push route, always with a leading slash.
    pub fn route_path(&self) -> String {
        let p = self.path.trim();
        if p.is_empty() {
            default_api_path()
        } else if p.starts_with('/') {
            p.to_string()
        } else {
            format!("/{}", p)
        }
    }
}

/// Host messengers. Each one configured here is registered under its platform id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessengersConfig {
    #[serde(default)]
    pub telegram: TelegramMessengerConfig,
}

/// Telegram Bot API messenger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramMessengerConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_BOT_TOKEN env when set.
    #[serde(default)]
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of messages waiting for delivery (default 100).
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the push token: env PUSHGATE_TOKEN overrides config.
pub fn resolve_token(config: &Config) -> String {
    non_empty_env("PUSHGATE_TOKEN").unwrap_or_else(|| config.api.token.trim().to_string())
}

/// Resolve the Telegram bot token: env TELEGRAM_BOT_TOKEN overrides config.
pub fn resolve_telegram_token(config: &Config) -> Option<String> {
    non_empty_env("TELEGRAM_BOT_TOKEN").or_else(|| {
        config
            .messengers
            .telegram
            .bot_token
            .as_ref()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PUSHGATE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".pushgate").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Random URL-safe token (32 bytes of OS randomness, base64 without padding).
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("generating token: {}", e))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Write config as pretty JSON, creating the parent directory if needed.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config).context("serializing config")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing config to {}", path.display()))
}

/// Load config from `path`, generating it with defaults when missing.
/// Fields absent from an existing file take their defaults; an empty token is
/// replaced with a fresh one and written back.
pub fn load_or_generate(path: &Path) -> Result<Config> {
    let fresh = !path.exists();
    let mut config = if !fresh {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str::<Config>(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    } else {
        log::info!("config file not found, generating defaults at {}", path.display());
        Config::default()
    };

    if fresh || config.api.token.trim().is_empty() {
        if config.api.token.trim().is_empty() {
            config.api.token = generate_token()?;
        }
        save_config(path, &config)?;
        log::info!("wrote config to {}", path.display());
    }
    if config.api.default_recipient().is_none() {
        log::warn!(
            "api.default_umo is not set in {}; pushes without a umo will be rejected",
            path.display()
        );
    }
    Ok(config)
}
