//! Configuration Module
//!
//! Describes how a cache is built: its TTL, key prefix and how the backing
//! store client is obtained.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::store::Store;

/// Extra driver options passed verbatim to the store client library.
pub type DriverOptions = BTreeMap<String, Value>;

/// Zero-argument factory returning an already configured store client.
pub type StoreFactory = Arc<dyn Fn() -> Arc<dyn Store> + Send + Sync>;

// == Connection Params ==
/// Connection parameters for a store client built by a driver.
///
/// Any field other than `host` and `port` lands in `options` when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionParams {
    /// Store host name
    #[serde(default = "default_host")]
    pub host: String,
    /// Store port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Remaining driver options, never containing host or port
    #[serde(flatten)]
    pub options: DriverOptions,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            options: DriverOptions::new(),
        }
    }

    /// Adds a driver option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::new(default_host(), default_port())
    }
}

// == Store Config ==
/// How the backing store client is obtained.
#[derive(Clone)]
pub enum StoreConfig {
    /// Build a client from connection parameters through a driver
    Params(ConnectionParams),
    /// Use the client returned by a caller supplied factory
    Supplied(StoreFactory),
}

impl StoreConfig {
    /// Wraps a factory closure.
    pub fn supplied<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Store> + Send + Sync + 'static,
    {
        StoreConfig::Supplied(Arc::new(factory))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Params(ConnectionParams::default())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Params(params) => f.debug_tuple("Params").field(params).finish(),
            StoreConfig::Supplied(_) => f.write_str("Supplied(..)"),
        }
    }
}

// == Cache Config ==
/// Cache configuration parameters.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Entry TTL in milliseconds; 0 disables writes
    pub ttl_ms: u64,
    /// Prefix prepended to every logical key
    pub prefix: String,
    /// Backing store selection
    pub store: StoreConfig,
}

impl CacheConfig {
    pub fn new(ttl_ms: u64, store: StoreConfig) -> Self {
        Self {
            ttl_ms,
            prefix: String::new(),
            store,
        }
    }

    /// Sets the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Effective TTL in whole seconds, rounded up.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_ms.div_ceil(1000)
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 0, caching disabled)
    /// - `CACHE_PREFIX` - Key prefix (default: empty)
    /// - `REDIS_HOST` - Store host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Store port (default: 6379)
    /// - `REDIS_DB` - Database index driver option (unset by default)
    /// - `REDIS_USERNAME` - Username driver option (unset by default)
    /// - `REDIS_PASSWORD` - Password driver option (unset by default)
    pub fn from_env() -> Self {
        let mut params = ConnectionParams::new(
            env::var("REDIS_HOST").unwrap_or_else(|_| default_host()),
            parse_env("REDIS_PORT").unwrap_or_else(default_port),
        );
        if let Some(db) = parse_env::<i64>("REDIS_DB") {
            params = params.with_option("db", db);
        }
        if let Ok(username) = env::var("REDIS_USERNAME") {
            params = params.with_option("username", username);
        }
        if let Ok(password) = env::var("REDIS_PASSWORD") {
            params = params.with_option("password", password);
        }

        Self {
            ttl_ms: parse_env("CACHE_TTL_MS").unwrap_or(0),
            prefix: env::var("CACHE_PREFIX").unwrap_or_default(),
            store: StoreConfig::Params(params),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
