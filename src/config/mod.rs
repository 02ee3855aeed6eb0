//! Configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::fanout::RetryPolicy;
use crate::fetch::RiotClientConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Riot API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiotConfig {
    /// Developer API key; can also come from RIOT_API_KEY.
    #[serde(default)]
    pub api_key: String,

    /// Default platform shard, e.g. "euw1" or "na1"
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_riot_timeout")]
    pub timeout_secs: u64,
}

fn default_platform() -> String {
    "euw1".to_string()
}

fn default_riot_timeout() -> u64 {
    10
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            platform: default_platform(),
            timeout_secs: default_riot_timeout(),
        }
    }
}

impl RiotConfig {
    /// Translate into the gateway client's configuration.
    pub fn client_config(&self) -> RiotClientConfig {
        RiotClientConfig {
            api_key: self.api_key.clone(),
            platform: self.platform.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..RiotClientConfig::default()
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Fallback TTL in seconds for entries without an endpoint TTL
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,

    /// Entry cap before eviction kicks in
    #[serde(default = "default_cache_size")]
    pub max_size: usize,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_size() -> usize {
    1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl(),
            max_size: default_cache_size(),
        }
    }
}

/// Concurrent fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanoutConfig {
    /// Lookups in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per item, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Sleep between attempts in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_concurrency() -> usize {
    3
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    150
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl FanoutConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Data Dragon asset enrichment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_assets_enabled")]
    pub enabled: bool,
}

fn default_assets_enabled() -> bool {
    true
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: default_assets_enabled(),
        }
    }
}

/// League client (LCU) integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalSessionConfig {
    /// Whether the local client may be consulted at all
    #[serde(default)]
    pub enabled: bool,

    /// Port from the client lockfile
    #[serde(default)]
    pub port: u16,

    /// Auth token from the client lockfile
    #[serde(default)]
    pub token: String,
}

/// Local persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            data_dir: default_data_dir(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub riot: RiotConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub fanout: FanoutConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub local_session: LocalSessionConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            riot: RiotConfig::default(),
            cache: CacheConfig::default(),
            fanout: FanoutConfig::default(),
            assets: AssetsConfig::default(),
            local_session: LocalSessionConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration: the file if it exists, defaults otherwise,
    /// with RIOT_API_KEY from the environment taking precedence.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var("RIOT_API_KEY") {
            if !key.is_empty() {
                config.riot.api_key = key;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.riot.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "riot.api_key is required (set in config or RIOT_API_KEY)".to_string(),
            ));
        }

        if self.riot.platform.is_empty() {
            return Err(ConfigError::ValidationError(
                "riot.platform must not be empty".to_string(),
            ));
        }

        if self.riot.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "riot.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.cache.max_size == 0 {
            return Err(ConfigError::ValidationError(
                "cache.max_size must be greater than 0".to_string(),
            ));
        }

        if self.fanout.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "fanout.concurrency must be greater than 0".to_string(),
            ));
        }

        if self.fanout.retry_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "fanout.retry_attempts must be greater than 0".to_string(),
            ));
        }

        if self.local_session.enabled {
            if self.local_session.port == 0 {
                return Err(ConfigError::ValidationError(
                    "local_session.port is required when local_session is enabled".to_string(),
                ));
            }
            if self.local_session.token.is_empty() {
                return Err(ConfigError::ValidationError(
                    "local_session.token is required when local_session is enabled".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.riot.api_key = "RGAPI-test".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.riot.platform, "euw1");
        assert_eq!(config.riot.timeout_secs, 10);
        assert_eq!(config.cache.max_size, 1024);
        assert_eq!(config.fanout.concurrency, 3);
        assert!(config.assets.enabled);
        assert!(!config.local_session.enabled);
        assert!(!config.store.enabled);
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_requires_api_key() {
        let config = AppConfig::default();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_concurrency() {
        let mut config = valid_config();
        config.fanout.concurrency = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_local_session_needs_credentials() {
        let mut config = valid_config();
        config.local_session.enabled = true;

        assert!(config.validate().is_err());

        config.local_session.port = 54321;
        config.local_session.token = "token".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[riot]
api_key = "RGAPI-file"
platform = "na1"

[fanout]
concurrency = 5

[store]
enabled = true
data_dir = "/tmp/coach-data"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.riot.api_key, "RGAPI-file");
        assert_eq!(config.riot.platform, "na1");
        // Unset fields keep their defaults.
        assert_eq!(config.riot.timeout_secs, 10);
        assert_eq!(config.fanout.concurrency, 5);
        assert_eq!(config.fanout.retry_attempts, 2);
        assert!(config.store.enabled);
        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/coach-data"));
    }

    #[test]
    fn test_retry_policy_from_fanout_config() {
        let mut config = FanoutConfig::default();
        config.retry_attempts = 4;
        config.retry_delay_ms = 250;

        let policy = config.retry_policy();

        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_client_config_mapping() {
        let mut config = RiotConfig::default();
        config.api_key = "RGAPI-test".to_string();
        config.timeout_secs = 15;

        let client_config = config.client_config();

        assert_eq!(client_config.api_key, "RGAPI-test");
        assert_eq!(client_config.timeout, Duration::from_secs(15));
        assert_eq!(client_config.base_domain, "api.riotgames.com");
    }

    #[test]
    fn test_config_serialization() {
        let config = valid_config();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.riot.platform, parsed.riot.platform);
        assert_eq!(config.cache.max_size, parsed.cache.max_size);
    }
}
