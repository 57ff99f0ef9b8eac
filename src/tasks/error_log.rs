//! Error Channel Logger
//!
//! Process-level handler for a store's out-of-band error channel.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::store::ErrorEvent;

/// Spawns a task that logs every event received on `errors`.
///
/// The task exits once the channel closes, i.e. when the store client that
/// owns it is dropped. Returns the number of events logged.
pub fn spawn_error_logger(mut errors: broadcast::Receiver<ErrorEvent>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut logged = 0;

        loop {
            match errors.recv().await {
                Ok(event) => {
                    logged += 1;
                    error!(
                        key = %event.key,
                        error = %event.error,
                        occurred_at = %event.occurred_at,
                        "Background cache operation failed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Error logger lagged behind cache error events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Cache error channel closed, error logger shutting down");
                    break;
                }
            }
        }

        logged
    })
}
