//! Error types for the resource cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by the backing key-value store.
///
/// Cloneable so a single failure can be fanned out to every subscriber of
/// the store's error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The store rejected or failed a command
    #[error("Command failed: {0}")]
    Command(String),

    /// A transactional write was aborted
    #[error("Transaction aborted: {0}")]
    Transaction(String),
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            StoreError::Connection(err.to_string())
        } else if err.kind() == redis::ErrorKind::ExecAbortError {
            StoreError::Transaction(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the resource cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache could not be built from its configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backing store failed during read, write or delete
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Value could not be encoded into a payload
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stored payload could not be decoded
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the resource cache.
pub type Result<T> = std::result::Result<T, CacheError>;
