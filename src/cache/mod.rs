//! Cache Module
//!
//! JSON encoding facade over a key-value store with a fixed TTL.

mod facade;
mod key;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use facade::Cache;
pub use key::CacheKey;
