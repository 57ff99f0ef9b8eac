//! Cache Facade
//!
//! Translates logical get/set/delete calls into store commands, running
//! values through the payload codec on the way in and out.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheKey;
use crate::codec;
use crate::config::{CacheConfig, StoreConfig};
use crate::error::Result;
use crate::store::{default_driver, Driver, ErrorEvent, Store};

// == Cache ==
/// Resource cache backed by a single store client.
///
/// Cloning is cheap: clones share the same store client.
#[derive(Clone)]
pub struct Cache {
    /// Effective TTL in whole seconds; 0 disables writes
    ttl_secs: u64,
    /// Prefix prepended to every logical key
    prefix: String,
    /// Shared store client
    store: Arc<dyn Store>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache, building the store client with the default driver
    /// when connection parameters are given.
    ///
    /// # Errors
    /// `CacheError::Configuration` when no store client library is
    /// available or the parameters are rejected by it.
    pub fn new(config: CacheConfig) -> Result<Self> {
        match config.store {
            StoreConfig::Params(_) => Self::with_driver(config, default_driver()?),
            StoreConfig::Supplied(_) => Self::build(config, None),
        }
    }

    /// Creates a cache, using `driver` to build the client from connection
    /// parameters. The driver is not consulted for supplied stores.
    pub fn with_driver(config: CacheConfig, driver: &dyn Driver) -> Result<Self> {
        Self::build(config, Some(driver))
    }

    fn build(config: CacheConfig, driver: Option<&dyn Driver>) -> Result<Self> {
        let ttl_secs = config.ttl_secs();
        let store = match config.store {
            StoreConfig::Supplied(factory) => factory(),
            StoreConfig::Params(params) => {
                let driver = match driver {
                    Some(driver) => driver,
                    None => default_driver()?,
                };
                driver.create_client(params.port, &params.host, &params.options)?
            }
        };

        info!(ttl_secs, prefix = %config.prefix, "Resource cache created");

        Ok(Self {
            ttl_secs,
            prefix: config.prefix,
            store,
        })
    }

    // == Accessors ==
    /// Effective TTL in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The underlying store client.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Subscribes to the store's out-of-band error channel.
    pub fn subscribe_errors(&self) -> broadcast::Receiver<ErrorEvent> {
        self.store.subscribe_errors()
    }

    // == Get ==
    /// Returns the value stored under `key`.
    ///
    /// `Ok(None)` for an empty key (no store call) and for missing or
    /// expired entries. Store failures propagate unchanged; a corrupt payload
    /// is a `Deserialization` error.
    pub async fn get<T, K>(&self, key: K) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        K: CacheKey,
    {
        let Some(key) = self.storage_key(&key) else {
            return Ok(None);
        };

        let payload = self.store.read(&key).await?;
        codec::decode(payload.as_deref())
    }

    // == Set ==
    /// Stores `value` under `key` with the configured TTL.
    ///
    /// Does nothing for an empty key or a zero TTL. Encoding and store
    /// failures are returned to the caller and are not emitted on the error
    /// channel.
    pub async fn set<T, K>(&self, key: K, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
        K: CacheKey,
    {
        let Some(key) = self.writable_key(&key) else {
            return Ok(());
        };

        let payload = codec::encode(value)?;
        self.store
            .write_with_expiry(&key, &payload, self.ttl_secs)
            .await?;
        Ok(())
    }

    /// Fire-and-forget variant of [`Cache::set`].
    ///
    /// The value is encoded right away and written by a spawned task. Any
    /// failure is emitted once on the store's error channel. Returns `None`
    /// when nothing was scheduled.
    ///
    /// # Panics
    /// When called outside of a Tokio runtime, like `tokio::spawn`.
    pub fn set_detached<T, K>(&self, key: K, value: &T) -> Option<JoinHandle<()>>
    where
        T: Serialize + ?Sized,
        K: CacheKey,
    {
        let key = self.writable_key(&key)?;

        let payload = match codec::encode(value) {
            Ok(payload) => payload,
            Err(err) => {
                self.store.emit_error(ErrorEvent::new(key, err));
                return None;
            }
        };

        let store = Arc::clone(&self.store);
        let ttl_secs = self.ttl_secs;
        Some(tokio::spawn(async move {
            if let Err(err) = store.write_with_expiry(&key, &payload, ttl_secs).await {
                store.emit_error(ErrorEvent::new(key, err.into()));
            }
        }))
    }

    // == Delete ==
    /// Removes `key` from the store. Does nothing for an empty key.
    pub async fn delete<K>(&self, key: K) -> Result<()>
    where
        K: CacheKey,
    {
        let Some(key) = self.storage_key(&key) else {
            return Ok(());
        };

        self.store.delete(&key).await?;
        Ok(())
    }

    // == Helpers ==
    fn storage_key<K: CacheKey + ?Sized>(&self, key: &K) -> Option<String> {
        key.as_key().map(|key| format!("{}{}", self.prefix, key))
    }

    /// Storage key for a write, or `None` when the write is a no-op.
    fn writable_key<K: CacheKey + ?Sized>(&self, key: &K) -> Option<String> {
        if self.ttl_secs == 0 {
            debug!("Skipping cache write: TTL is zero");
            return None;
        }
        self.storage_key(key)
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("ttl_secs", &self.ttl_secs)
            .field("prefix", &self.prefix)
            .field("store", &self.store)
            .finish()
    }
}
