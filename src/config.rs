use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::routing::{RouteOptions, DEFAULT_WALKING_SPEED_MPS};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub gatewalk: GatewalkConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Gatewalk-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewalkConfig {
    /// Directory containing `airports/<code>/...`.
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Routing engine tunables
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_walking_speed")]
    pub walking_speed_mps: f64,
    #[serde(default = "default_max_stops")]
    pub max_stops: usize,
    /// 0 = no per-request search deadline
    #[serde(default)]
    pub search_timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walking_speed_mps: default_walking_speed(),
            max_stops: default_max_stops(),
            search_timeout_ms: 0,
        }
    }
}

/// Cache sizing
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_floor_capacity")]
    pub floor_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            floor_capacity: default_floor_capacity(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Route client configuration (remote API with local fallback)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_client_base_url")]
    pub base_url: String,
    #[serde(default = "default_client_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_client_base_url(),
            timeout_ms: default_client_timeout_ms(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_walking_speed() -> f64 {
    DEFAULT_WALKING_SPEED_MPS
}

fn default_max_stops() -> usize {
    10
}

fn default_floor_capacity() -> usize {
    32
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_client_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_client_timeout_ms() -> u64 {
    5000
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in GATEWALK_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// `PORT`, when set, overrides `http_server.port`.
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("GATEWALK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let mut config = Self::from_file(&config_path)?;

        if let Ok(port) = std::env::var("PORT") {
            config.http_server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.gatewalk.data_dir.is_dir() {
            anyhow::bail!(
                "data_dir must be an existing directory: {}. Set data_dir in config.toml.",
                self.gatewalk.data_dir.display()
            );
        }

        let speed = self.routing.walking_speed_mps;
        if !speed.is_finite() || speed <= 0.0 {
            anyhow::bail!("routing.walking_speed_mps must be a positive number, got {}", speed);
        }

        if self.cache.floor_capacity == 0 {
            anyhow::bail!("cache.floor_capacity must be greater than 0");
        }

        url::Url::parse(&self.client.base_url)
            .with_context(|| format!("client.base_url is not a valid URL: {}", self.client.base_url))?;

        Ok(())
    }

    /// Logger filter: `RUST_LOG` when set, otherwise `gatewalk.log_level`.
    pub fn log_filter(&self) -> String {
        std::env::var("RUST_LOG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.gatewalk.log_level.clone())
    }

    pub fn data_dir(&self) -> &Path {
        &self.gatewalk.data_dir
    }

    /// Routing options derived from `[routing]`.
    pub fn route_options(&self) -> RouteOptions {
        RouteOptions {
            walking_speed_mps: self.routing.walking_speed_mps,
            max_stops: self.routing.max_stops,
            search_timeout_ms: self.routing.search_timeout_ms,
        }
    }
}
