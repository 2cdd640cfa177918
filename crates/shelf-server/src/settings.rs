//! Server configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SHELF__` environment variables (`__` separates sections, e.g.
//! `SHELF__CACHE__SHARED_TTL_SECONDS=900`).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Source};
use serde::Deserialize;
use shelf_core::DatasetSet;
use shelf_origin::{SheetsConfig, SourceError};
use thiserror::Error;

use crate::cache::{CachePolicy, PolicyError};
use crate::cache::policy::{
    DEFAULT_KEY_PREFIX, DEFAULT_LOCAL_RETENTION_SECONDS, DEFAULT_LOCAL_TTL_SECONDS,
    DEFAULT_LOCK_TTL_SECONDS, DEFAULT_REVALIDATE_RATIO, DEFAULT_SHARED_TTL_SECONDS,
};

/// Env var holding the config file path.
pub const CONFIG_PATH_ENV: &str = "SHELF_CONFIG";
/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "shelf.toml";

/// Configuration load failure at startup.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid cache policy: {0}")]
    Policy(#[from] PolicyError),
}

impl From<SourceError> for SettingsError {
    fn from(err: SourceError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl From<shelf_core::CoreError> for SettingsError {
    fn from(err: shelf_core::CoreError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub origin: OriginSettings,
    pub redis: RedisSettings,
    pub admin: AdminSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Identifies this process in lock holder ids. Defaults to `pid-<pid>`.
    pub worker_id: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            worker_id: None,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SettingsError::Invalid(format!("server address: {}", e)))
    }

    pub fn worker_id(&self) -> String {
        self.worker_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("pid-{}", std::process::id()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub key_prefix: String,
    pub local_ttl_seconds: u64,
    pub shared_ttl_seconds: u64,
    pub lock_ttl_seconds: u64,
    pub revalidate_ratio: f64,
    pub local_retention_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            local_ttl_seconds: DEFAULT_LOCAL_TTL_SECONDS,
            shared_ttl_seconds: DEFAULT_SHARED_TTL_SECONDS,
            lock_ttl_seconds: DEFAULT_LOCK_TTL_SECONDS,
            revalidate_ratio: DEFAULT_REVALIDATE_RATIO,
            local_retention_seconds: DEFAULT_LOCAL_RETENTION_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OriginSettings {
    pub base_url: Option<String>,
    pub spreadsheet_id: String,
    pub api_key: String,
    pub timeout_ms: u64,
    /// Logical dataset names, in response order.
    pub datasets: Vec<String>,
    /// Optional dataset → sheet range overrides.
    pub ranges: HashMap<String, String>,
}

impl Default for OriginSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            spreadsheet_id: String::new(),
            api_key: String::new(),
            timeout_ms: 8_000,
            datasets: [
                "products",
                "specs",
                "category_photos",
                "categories",
                "announcements",
                "promotions",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            ranges: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Without a URL the in-memory store is used (single node only).
    pub url: Option<String>,
}

impl RedisSettings {
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Token required by the invalidation endpoint; unset disables it.
    pub token: Option<String>,
}

impl AdminSettings {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

impl Settings {
    /// Loads from `$SHELF_CONFIG` (or `shelf.toml`) and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(
            File::new(&path, FileFormat::Toml).required(false),
            Self::environment(),
        )
    }

    /// Loads from a TOML string layered under the given environment source.
    pub fn from_toml(toml: &str, env: Environment) -> Result<Self, SettingsError> {
        Self::from_sources(File::from_str(toml, FileFormat::Toml), env)
    }

    /// The `SHELF__` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix("SHELF")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("origin.datasets")
    }

    fn from_sources<F>(file: F, env: Environment) -> Result<Self, SettingsError>
    where
        F: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validated dataset set.
    pub fn datasets(&self) -> Result<DatasetSet, SettingsError> {
        Ok(DatasetSet::new(self.origin.datasets.iter().cloned())?)
    }

    /// Cache policy derived from the cache and origin sections.
    pub fn cache_policy(&self) -> Result<CachePolicy, SettingsError> {
        let policy = CachePolicy::new(self.datasets()?)
            .with_key_prefix(self.cache.key_prefix.clone())
            .with_local_ttl(self.cache.local_ttl_seconds)
            .with_shared_ttl(self.cache.shared_ttl_seconds)
            .with_lock_ttl(self.cache.lock_ttl_seconds)
            .with_revalidate_ratio(self.cache.revalidate_ratio)
            .with_fetch_timeout(Duration::from_millis(self.origin.timeout_ms))
            .with_local_retention(Duration::from_secs(self.cache.local_retention_seconds));
        policy.validate()?;
        Ok(policy)
    }

    /// Sheets client configuration.
    pub fn sheets_config(&self) -> Result<SheetsConfig, SettingsError> {
        let mut builder = SheetsConfig::builder()
            .spreadsheet_id(self.origin.spreadsheet_id.clone())
            .api_key(self.origin.api_key.clone())
            .ranges(self.origin.ranges.clone())
            .request_timeout(Duration::from_millis(self.origin.timeout_ms.saturating_mul(2)));
        if let Some(url) = &self.origin.base_url {
            builder = builder.base_url(url.clone());
        }
        Ok(builder.build()?)
    }

    /// Checks everything `main` needs before binding.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.server.addr()?;
        self.cache_policy()?;
        self.sheets_config()?;
        Ok(())
    }
}
