//! Resource Cache - JSON values in a key-value store with a fixed TTL
//!
//! Stores structured values as JSON payloads in Redis (or any [`Store`]),
//! writing payload and expiration atomically.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use cache::{Cache, CacheKey};
pub use config::{CacheConfig, ConnectionParams, DriverOptions, StoreConfig, StoreFactory};
pub use error::{CacheError, Result, StoreError};
pub use store::{Driver, ErrorChannel, ErrorEvent, MemoryStore, Store};
#[cfg(feature = "redis")]
pub use store::{RedisDriver, RedisStore};
pub use tasks::{spawn_cleanup_task, spawn_error_logger};
