//! # Client Configuration
//!
//! Where the backend lives, how long to wait for it, and a few screen limits.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HUEVO_BACKEND_URL=ws://127.0.0.1:7878/pos                          │
//! │     HUEVO_CALL_TIMEOUT_MS=7000                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/config.toml (Linux)                                  │
//! │     ~/Library/Application Support/ar.huevosanto.pos/config.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [backend]
//! url = "ws://127.0.0.1:7878/pos"
//! connect_timeout_secs = 10
//! call_timeout_ms = 7000
//!
//! [stock]
//! history_movements_limit = 15
//! history_prices_limit = 10
//! history_max_entries = 20
//! list_page_size = 50
//!
//! [session]
//! storage_path = "/var/lib/huevo/session.toml"
//!
//! [store]
//! name = "Huevo Santo"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Connection to the POS backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// WebSocket URL of the command endpoint.
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Liveness guard on critical-path calls (milliseconds).
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,

    /// Keepalive ping interval (seconds).
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
}

fn default_backend_url() -> String {
    "ws://127.0.0.1:7878/pos".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_call_timeout() -> u64 {
    7000
}

fn default_ping_interval() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: default_backend_url(),
            connect_timeout_secs: default_connect_timeout(),
            call_timeout_ms: default_call_timeout(),
            ping_interval_secs: default_ping_interval(),
        }
    }
}

impl BackendSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

// =============================================================================
// Stock Settings
// =============================================================================

/// Limits of the stock screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSettings {
    #[serde(default = "default_history_movements")]
    pub history_movements_limit: u32,

    #[serde(default = "default_history_prices")]
    pub history_prices_limit: u32,

    #[serde(default = "default_history_max")]
    pub history_max_entries: usize,

    #[serde(default = "default_page_size")]
    pub list_page_size: u32,
}

fn default_history_movements() -> u32 {
    huevo_core::HISTORY_MOVEMENT_LIMIT
}

fn default_history_prices() -> u32 {
    huevo_core::HISTORY_PRICE_LIMIT
}

fn default_history_max() -> usize {
    huevo_core::HISTORY_MAX_ENTRIES
}

fn default_page_size() -> u32 {
    50
}

impl Default for StockSettings {
    fn default() -> Self {
        StockSettings {
            history_movements_limit: default_history_movements(),
            history_prices_limit: default_history_prices(),
            history_max_entries: default_history_max(),
            list_page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Session & Store Settings
// =============================================================================

/// Where the session cache is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session file. Defaults to `session.toml` in the data directory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl SessionSettings {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(|| {
            directories::ProjectDirs::from("ar", "huevosanto", "pos")
                .map(|dirs| dirs.data_dir().join("session.toml"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_name() -> String {
    "Huevo Santo".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub stock: StockSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = &self.backend.url;
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(ClientError::InvalidUrl(format!(
                "Backend URL must start with ws:// or wss://, got: {}",
                url
            )));
        }
        url::Url::parse(url)?;

        if self.backend.call_timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "call_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.stock.list_page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "list_page_size must be greater than 0".into(),
            ));
        }

        if self.stock.history_max_entries == 0 {
            return Err(ClientError::InvalidConfig(
                "history_max_entries must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HUEVO_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Ok(ms) = std::env::var("HUEVO_CALL_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.backend.call_timeout_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring invalid HUEVO_CALL_TIMEOUT_MS"),
            }
        }

        if let Ok(secs) = std::env::var("HUEVO_CONNECT_TIMEOUT_SECS") {
            if let Ok(v) = secs.parse::<u64>() {
                self.backend.connect_timeout_secs = v;
            }
        }

        if let Ok(path) = std::env::var("HUEVO_SESSION_PATH") {
            self.session.storage_path = Some(PathBuf::from(path));
        }

        if let Ok(name) = std::env::var("HUEVO_STORE_NAME") {
            self.store.name = name;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ar", "huevosanto", "pos")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
