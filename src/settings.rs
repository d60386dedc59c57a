//! Runtime settings, read from an optional TOML file and overridden by
//! `SALDO__<SECTION>__<KEY>` environment variables.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::storage::StoreOptions;

pub const DEFAULT_CONFIG_PATH: &str = "settings.toml";
const ENV_PREFIX: &str = "SALDO";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// Log level used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            path: "saldo.db".to_string(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
        }
    }
}

impl Database {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_connections: self.max_connections.max(1),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rates {
    pub base_url: String,
    pub access_key: String,
    pub base_currency: String,
    pub timeout_secs: u64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            base_url: "http://api.exchangeratesapi.io/v1/latest".to_string(),
            access_key: String::new(),
            base_currency: "EUR".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Rates {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Server,
    pub rates: Rates,
}

impl Settings {
    /// Load settings from `path` (missing file is fine) and the environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Self::builder(path)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder(path: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
        Config::builder().add_source(File::with_name(path).required(false))
    }
}
