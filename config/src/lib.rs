//! # Configuration Management for ReadThrough
//!
//! This crate provides centralized configuration structures for all ReadThrough components,
//! including per-resource cache TTLs, filter sentinels and the mutation signal system.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{CacheConfig, ResourceConfig, SignalConfig};
//!
//! let cache_config = CacheConfig::new(300_000)
//!     .with_resource("categorias", ResourceConfig::with_ttl(600_000))
//!     .with_resource(
//!         "estadisticas",
//!         ResourceConfig::with_ttl(60_000).invalidated_by(["ventas"]),
//!     );
//!
//! let signal_config = SignalConfig::new(64);
//! # let _ = (cache_config, signal_config);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [cache]
//! default_ttl_ms = 300000
//! sweep_interval_ms = 60000
//! sentinel_values = ["todos"]
//!
//! [cache.resources.categorias]
//! ttl_ms = 600000
//!
//! [cache.resources.estadisticas]
//! ttl_ms = 60000
//! invalidated_by = ["ventas", "productos"]
//!
//! [signal]
//! max_callbacks = 256
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from readthrough.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./readthrough.toml";
const CONFIG_PATH_VAR: &str = "READTHROUGH_CONFIG";

const DEFAULT_TTL_MS: u64 = 300_000;
const DEFAULT_MAX_CALLBACKS: usize = 256;
const DEFAULT_SENTINEL: &str = "todos";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub signal: SignalConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied to resources without an override (milliseconds)
    pub default_ttl_ms: u64,
    /// Interval of the expired-entry sweeper, 0 disables it (milliseconds)
    pub sweep_interval_ms: u64,
    /// Filter values meaning "no filter"; stripped from cache keys
    pub sentinel_values: Vec<String>,
    /// Per resource kind overrides
    pub resources: BTreeMap<String, ResourceConfig>,
}

/// Per-resource cache settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// TTL for this resource (milliseconds), falls back to `default_ttl_ms`
    pub ttl_ms: Option<u64>,
    /// Other resource kinds whose mutations also invalidate this one
    pub invalidated_by: Vec<String>,
}

/// Signal system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub max_callbacks: usize,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the variable may come from the process environment
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;

        if self.signal.max_callbacks == 0 {
            return Err(ConfigError::Invalid(
                "Signal max_callbacks must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(default_ttl_ms: u64) -> Self {
        Self {
            default_ttl_ms,
            ..Self::default()
        }
    }

    pub fn with_resource(mut self, kind: &str, resource: ResourceConfig) -> Self {
        self.resources.insert(kind.to_string(), resource);
        self
    }

    pub fn with_sentinels<I, S>(mut self, sentinels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentinel_values = sentinels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sweep_interval(mut self, interval_ms: u64) -> Self {
        self.sweep_interval_ms = interval_ms;
        self
    }

    /// Default TTL as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Effective TTL for a resource kind
    pub fn ttl_for(&self, kind: &str) -> Duration {
        let ttl_ms = self
            .resources
            .get(kind)
            .and_then(|resource| resource.ttl_ms)
            .unwrap_or(self.default_ttl_ms);
        Duration::from_millis(ttl_ms)
    }

    /// Resource kinds whose mutations invalidate `kind`, itself included
    pub fn invalidation_sources(&self, kind: &str) -> Vec<String> {
        let mut sources = vec![kind.to_string()];
        if let Some(resource) = self.resources.get(kind) {
            for source in &resource.invalidated_by {
                if !sources.contains(source) {
                    sources.push(source.clone());
                }
            }
        }
        sources
    }

    /// Sweeper interval, `None` when disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_ms > 0).then(|| Duration::from_millis(self.sweep_interval_ms))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl_ms == 0 {
            return Err(ConfigError::Invalid(
                "Cache default_ttl_ms must be greater than 0".to_string(),
            ));
        }
        if self.sentinel_values.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "Cache sentinel_values cannot contain blank values".to_string(),
            ));
        }

        for (kind, resource) in &self.resources {
            if kind.is_empty() || kind.contains(':') {
                return Err(ConfigError::Invalid(format!(
                    "Invalid resource kind '{}': must be non-empty and cannot contain ':'",
                    kind
                )));
            }
            if resource.ttl_ms == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "Resource '{}' ttl_ms must be greater than 0",
                    kind
                )));
            }
        }

        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL_MS,
            sweep_interval_ms: 0,
            sentinel_values: vec![DEFAULT_SENTINEL.to_string()],
            resources: BTreeMap::new(),
        }
    }
}

impl ResourceConfig {
    /// Create a resource configuration with its own TTL
    pub fn with_ttl(ttl_ms: u64) -> Self {
        Self {
            ttl_ms: Some(ttl_ms),
            invalidated_by: Vec::new(),
        }
    }

    pub fn invalidated_by<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalidated_by = kinds.into_iter().map(Into::into).collect();
        self
    }
}

impl SignalConfig {
    /// Create a new signal configuration
    pub fn new(max_callbacks: usize) -> Self {
        Self { max_callbacks }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            max_callbacks: DEFAULT_MAX_CALLBACKS,
        }
    }
}
