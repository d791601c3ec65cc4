//! Typed publish/subscribe bus for store change notifications
//!
//! Replaces stringly-named global notifications: consumers subscribe for
//! typed events and refresh whatever view they maintain.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted after successful local mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ProductsChanged,
    OrdersChanged,
    OrderShipped(Uuid),
}

/// Broadcast bus shared by the services that mutate the local store
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Lagging or absent subscribers are not an error.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
