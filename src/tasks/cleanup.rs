//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from a
//! [`MemoryStore`]. Expired entries are already invisible to reads; the sweep
//! only reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// # Arguments
/// * `store` - Shared in-memory store
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it on shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let cleanup_handle = spawn_cleanup_task(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
