//! Event broadcaster for WebSocket real-time updates.
//!
//! Uses tokio::sync::broadcast to fan-out events to all connected WebSocket clients.

use tokio::sync::broadcast;

use crate::models::{WsEvent, WsEventMessage};

/// Default capacity for the broadcast channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Event broadcaster that distributes events to all connected WebSocket clients.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<WsEventMessage>,
}

impl EventBroadcaster {
    /// Create a new EventBroadcaster with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new EventBroadcaster with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events.
    /// Returns a receiver that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<WsEventMessage> {
        self.sender.subscribe()
    }

    /// Broadcast an event to all subscribers.
    /// Returns the number of receivers that received the event.
    /// If there are no subscribers, returns 0 (does not error).
    pub fn send(&self, event: WsEventMessage) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Stamp and broadcast `event`.
    pub fn publish(&self, event: WsEvent) -> usize {
        self.send(WsEventMessage::new(event))
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefectStatus, Zone};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_broadcast_to_multiple_receivers() {
        let broadcaster = EventBroadcaster::new();

        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        let defect_id = Uuid::now_v7();
        let count = broadcaster.publish(WsEvent::zone_response_saved(defect_id, Zone::L2));
        assert_eq!(count, 2);

        let got1 = rx1.recv().await.unwrap();
        let got2 = rx2.recv().await.unwrap();
        assert_eq!(got1.event.defect_id(), defect_id);
        assert_eq!(got2.event.defect_id(), defect_id);
    }

    #[test]
    fn test_no_subscribers_no_error() {
        let broadcaster = EventBroadcaster::new();
        let count = broadcaster.publish(WsEvent::defect_updated(
            Uuid::now_v7(),
            DefectStatus::Closed,
        ));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_lagged_receiver_skips_ahead() {
        let broadcaster = EventBroadcaster::with_capacity(2);
        let mut rx = broadcaster.subscribe();

        for _ in 0..5 {
            broadcaster.publish(WsEvent::analysis_saved(Uuid::now_v7()));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(rx.recv().await.is_ok());
    }
}
