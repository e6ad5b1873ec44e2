//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `AFFINITY_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBED_CONCURRENCY, DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_POOL_SCOPE, DEFAULT_TOP_K,
    DEFAULT_WARM_START_CONFIDENCE,
};
use crate::scoring::CategoryWeights;
use crate::storage::is_valid_scope;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `AFFINITY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory for persisted pool state. Default: `./.data`.
    pub storage_path: PathBuf,

    /// Remote embedding endpoint. `None` selects the local hashing embedder.
    pub embedder_url: Option<String>,

    /// Neighbours averaged per role node. Default: `3`.
    pub top_k: usize,

    /// Default category weights. Default: 1.0 for every category.
    pub category_weights: CategoryWeights,

    /// Virtual trials a similarity score is worth at warm start. Default: `10.0`.
    pub warm_start_confidence: f64,

    /// Max in-flight embedding calls per graph build. Default: `8`.
    pub embed_concurrency: usize,

    /// Per-attribute embedding timeout. Default: 2s.
    pub embed_timeout: Duration,

    /// Store key the pool is saved under. Default: `default`.
    pub pool_scope: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            embedder_url: None,
            top_k: DEFAULT_TOP_K,
            category_weights: CategoryWeights::equal(),
            warm_start_confidence: DEFAULT_WARM_START_CONFIDENCE,
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
            embed_timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            pool_scope: DEFAULT_POOL_SCOPE.to_string(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "AFFINITY_PORT";
    const ENV_BIND_ADDR: &'static str = "AFFINITY_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "AFFINITY_STORAGE_PATH";
    const ENV_EMBEDDER_URL: &'static str = "AFFINITY_EMBEDDER_URL";
    const ENV_TOP_K: &'static str = "AFFINITY_TOP_K";
    const ENV_CATEGORY_WEIGHTS: &'static str = "AFFINITY_CATEGORY_WEIGHTS";
    const ENV_WARM_START_CONFIDENCE: &'static str = "AFFINITY_WARM_START_CONFIDENCE";
    const ENV_EMBED_CONCURRENCY: &'static str = "AFFINITY_EMBED_CONCURRENCY";
    const ENV_EMBED_TIMEOUT_MS: &'static str = "AFFINITY_EMBED_TIMEOUT_MS";
    const ENV_POOL_SCOPE: &'static str = "AFFINITY_POOL_SCOPE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let embedder_url = Self::parse_optional_string_from_env(Self::ENV_EMBEDDER_URL);
        let top_k = Self::parse_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let category_weights = match env::var(Self::ENV_CATEGORY_WEIGHTS) {
            Ok(value) if !value.trim().is_empty() => CategoryWeights::parse(&value)?,
            _ => defaults.category_weights,
        };
        let warm_start_confidence =
            Self::parse_from_env(Self::ENV_WARM_START_CONFIDENCE, defaults.warm_start_confidence)?;
        let embed_concurrency =
            Self::parse_from_env(Self::ENV_EMBED_CONCURRENCY, defaults.embed_concurrency)?;
        let embed_timeout = Self::parse_from_env(
            Self::ENV_EMBED_TIMEOUT_MS,
            defaults.embed_timeout.as_millis() as u64,
        )
        .map(Duration::from_millis)?;
        let pool_scope = Self::parse_string_from_env(Self::ENV_POOL_SCOPE, defaults.pool_scope);

        Ok(Self {
            port,
            bind_addr,
            storage_path,
            embedder_url,
            top_k,
            category_weights,
            warm_start_confidence,
            embed_concurrency,
            embed_timeout,
            pool_scope,
        })
    }

    /// Validates paths and numeric invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if self.top_k == 0 {
            return Err(Self::invalid(Self::ENV_TOP_K, "0", "must be at least 1"));
        }

        if !self.warm_start_confidence.is_finite() || self.warm_start_confidence < 0.0 {
            return Err(Self::invalid(
                Self::ENV_WARM_START_CONFIDENCE,
                &self.warm_start_confidence.to_string(),
                "must be a finite, non-negative number",
            ));
        }

        if self.embed_concurrency == 0 {
            return Err(Self::invalid(
                Self::ENV_EMBED_CONCURRENCY,
                "0",
                "must be at least 1",
            ));
        }

        if self.embed_timeout.is_zero() {
            return Err(Self::invalid(
                Self::ENV_EMBED_TIMEOUT_MS,
                "0",
                "must be non-zero",
            ));
        }

        if !is_valid_scope(&self.pool_scope) {
            return Err(Self::invalid(
                Self::ENV_POOL_SCOPE,
                &self.pool_scope,
                "must be 1-128 characters of [A-Za-z0-9._-], not starting with '.'",
            ));
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| Self::invalid(var_name, &value, &e.to_string())),
            Err(_) => Ok(default),
        }
    }
}
