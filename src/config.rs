//! Configuration loading for the `shotcache` binary.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.shotcache/config.toml` (user)
//! 3. `/etc/shotcache/config.toml` (system)
//!
//! The API key is loaded separately with mandatory permission checks:
//! 1. `~/.shotcache/secrets.toml` (user, must be 0600)
//! 2. `/etc/shotcache/secrets.toml` (system, must be 0600)
//! 3. `SHOTGUN_API_KEY` environment variable

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::RedisStore;
use crate::cache::redis_store::{DEFAULT_DB, DEFAULT_HOST, DEFAULT_PORT};
use crate::gateway::{CacheCoordinator, CacheCoordinatorBuilder};
use crate::types::ConnectionMode;
use crate::{Result, ShotcacheError};

/// Environment variable consulted when no secrets file provides a key.
pub const API_KEY_ENV_VAR: &str = "SHOTGUN_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Remote service connection.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the service, e.g. `https://studio.shotgunstudio.com`.
    pub base_url: String,
    /// Script name to authenticate as. Empty forces local mode.
    #[serde(default)]
    pub script_name: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

fn default_remote_timeout() -> u64 {
    60
}

/// Fast store connection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_host")]
    pub host: String,
    #[serde(default = "default_store_port")]
    pub port: u16,
    /// Logical database index (default: 1).
    #[serde(default = "default_store_db")]
    pub db: i64,
    /// Connection timeout in milliseconds. Unset blocks indefinitely.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// Command response timeout in milliseconds. Unset blocks indefinitely.
    #[serde(default)]
    pub response_timeout_ms: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_store_host(),
            port: default_store_port(),
            db: default_store_db(),
            connect_timeout_ms: None,
            response_timeout_ms: None,
        }
    }
}

fn default_store_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_store_port() -> u16 {
    DEFAULT_PORT
}

fn default_store_db() -> i64 {
    DEFAULT_DB
}

/// Caching behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Connection mode (default: cached).
    #[serde(default)]
    pub mode: ConnectionMode,
    /// TTL for queries without a `ttl` option (default: 600).
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::default(),
            default_ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    600
}

/// Secrets configuration (API key).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub remote: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.shotcache/config.toml`
    /// 3. `/etc/shotcache/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        Self::load_from_file(&path)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ShotcacheError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ShotcacheError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(ShotcacheError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".shotcache").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/shotcache/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(ShotcacheError::Configuration(
            "No config file found. Create ~/.shotcache/config.toml or /etc/shotcache/config.toml"
                .to_string(),
        ))
    }

    /// Prepare a coordinator builder from this configuration.
    ///
    /// `api_key` is only needed when a `[remote]` section is present.
    pub fn builder(&self, api_key: Option<String>) -> Result<CacheCoordinatorBuilder> {
        let store = RedisStore::from_host(&self.store.host, self.store.port, self.store.db)?
            .connection_timeout(self.store.connect_timeout_ms.map(Duration::from_millis))
            .response_timeout(self.store.response_timeout_ms.map(Duration::from_millis));

        let mut builder = CacheCoordinator::builder()
            .mode(self.cache.mode)
            .default_ttl(Duration::from_secs(self.cache.default_ttl_secs))
            .store(std::sync::Arc::new(store));

        if let Some(ref remote) = self.remote {
            builder = builder
                .shotgun(
                    &remote.base_url,
                    &remote.script_name,
                    api_key.unwrap_or_default(),
                )
                .remote_timeout(Duration::from_secs(remote.timeout_secs));
        }

        Ok(builder)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.shotcache/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/shotcache/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the key may come from the environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".shotcache").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_checked(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/shotcache/secrets.toml");
        if system_secrets.exists() {
            return Self::load_checked(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load a secrets file after verifying its permissions.
    pub fn load_checked(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            ShotcacheError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ShotcacheError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            ShotcacheError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(ShotcacheError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// Get the API key, falling back to `SHOTGUN_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.remote
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV_VAR).ok())
    }
}
