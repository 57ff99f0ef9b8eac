//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweep: removes expired entries from an in-memory store
//! - Error logger: logs failures emitted on a store's error channel

mod cleanup;
mod error_log;

pub use cleanup::spawn_cleanup_task;
pub use error_log::spawn_error_logger;
