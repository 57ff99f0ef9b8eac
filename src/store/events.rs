//! Out-of-band Error Channel
//!
//! Carries failures that have no caller left to report to, such as
//! fire-and-forget writes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::error;

use crate::error::CacheError;

/// Buffered events per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

// == Error Event ==
/// A failure emitted on a store's error channel.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    /// Storage key the failed operation targeted
    pub key: String,
    /// The failure
    pub error: Arc<CacheError>,
    /// When the failure was observed
    pub occurred_at: DateTime<Utc>,
}

impl ErrorEvent {
    pub fn new(key: impl Into<String>, error: CacheError) -> Self {
        Self {
            key: key.into(),
            error: Arc::new(error),
            occurred_at: Utc::now(),
        }
    }
}

// == Error Channel ==
/// Broadcast sink for [`ErrorEvent`]s owned by a store client.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    sender: broadcast::Sender<ErrorEvent>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Delivers an event to every subscriber.
    ///
    /// With no subscriber attached the event is logged instead of dropped.
    pub fn emit(&self, event: ErrorEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            error!(
                key = %event.key,
                error = %event.error,
                "Unobserved cache error (no error channel subscriber)"
            );
        }
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<ErrorEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}
