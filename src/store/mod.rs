//! Store Module
//!
//! Contract for the external key-value store behind the cache, plus the
//! in-memory and Redis implementations of it.

mod events;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::config::DriverOptions;
use crate::error::{Result, StoreError};

pub use events::{ErrorChannel, ErrorEvent};
pub use memory::{MemoryStore, StoreCalls};
#[cfg(feature = "redis")]
pub use redis_store::{RedisDriver, RedisStore};

// == Store Trait ==
/// Key-value store client used by the cache.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Point lookup; `Ok(None)` when the key is missing or expired.
    async fn read(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;

    /// Sets `payload` under `key` and its expiration to `ttl_secs`, both or neither.
    async fn write_with_expiry(
        &self,
        key: &str,
        payload: &str,
        ttl_secs: u64,
    ) -> std::result::Result<(), StoreError>;

    async fn delete(&self, key: &str) -> std::result::Result<(), StoreError>;

    /// Out-of-band error channel of this client.
    fn errors(&self) -> &ErrorChannel;

    fn emit_error(&self, event: ErrorEvent) {
        self.errors().emit(event);
    }

    fn subscribe_errors(&self) -> broadcast::Receiver<ErrorEvent> {
        self.errors().subscribe()
    }
}

// == Driver Trait ==
/// Store client library able to build a client from connection parameters.
pub trait Driver: Send + Sync {
    fn create_client(&self, port: u16, host: &str, options: &DriverOptions)
        -> Result<Arc<dyn Store>>;
}

/// Returns the driver used for `StoreConfig::Params`.
#[cfg(feature = "redis")]
pub fn default_driver() -> Result<&'static dyn Driver> {
    Ok(&RedisDriver)
}

/// Returns the driver used for `StoreConfig::Params`.
///
/// Fails because the crate was built without a store client library.
#[cfg(not(feature = "redis"))]
pub fn default_driver() -> Result<&'static dyn Driver> {
    Err(crate::error::CacheError::Configuration(
        "no store client library available: enable the `redis` feature".to_string(),
    ))
}
