//! Cache update event broadcasting.
//!
//! Replaces global notification broadcast with an explicit publish/subscribe
//! channel: subscribers hold a receiver whose lifetime they control.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast when the profile image cache changes after an upload.
/// Carries no payload beyond the timestamp; subscribers reload what they show.
#[derive(Debug, Clone, Copy)]
pub struct CacheEvent {
    /// When the cache was updated.
    pub timestamp: DateTime<Utc>,
}

/// Publish/subscribe channel for [`CacheEvent`]s.
#[derive(Debug, Clone)]
pub struct CacheEventBus {
    tx: broadcast::Sender<CacheEvent>,
}

impl CacheEventBus {
    /// Creates a bus buffering up to `capacity` undelivered events per
    /// subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribes to cache update events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.tx.subscribe()
    }

    /// Publishes a cache-updated event stamped with the current time.
    /// Delivery to zero subscribers is not an error.
    pub fn publish(&self) {
        let event = CacheEvent {
            timestamp: Utc::now(),
        };
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(subscribers = delivered, "Published cache update event");
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = CacheEventBus::default();
        let mut rx = bus.subscribe();

        let before = Utc::now();
        bus.publish();

        let event = rx.recv().await.unwrap();
        assert!(event.timestamp >= before);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = CacheEventBus::default();
        bus.publish();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropped_subscriber_is_not_counted() {
        let bus = CacheEventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
