//! Order lifecycle coordinator
//!
//! The single writer allowed to move an order between statuses. The local
//! status write always lands first; remote propagation runs on a spawned
//! task whose outcome the caller may observe through the receipt, or drop.

use tokio::sync::oneshot;
use uuid::Uuid;

use shared::{Order, OrderStatus};

use crate::error::{AppError, AppResult};
use crate::events::{EventBus, StoreEvent};

use super::orders::OrderService;
use super::sync::SyncService;

/// Result of the remote side of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Synced,
    Failed(String),
}

/// What a transition produced: the updated order, and a handle on the
/// remote push when one was spawned
#[derive(Debug)]
pub struct TransitionReceipt {
    pub order: Order,
    pub remote: Option<oneshot::Receiver<RemoteOutcome>>,
}

/// Coordinator enforcing the order state machine
#[derive(Clone)]
pub struct LifecycleService {
    orders: OrderService,
    sync: Option<SyncService>,
    events: Option<EventBus>,
}

impl LifecycleService {
    /// Local-only coordinator, no remote propagation.
    pub fn new(orders: OrderService) -> Self {
        Self {
            orders,
            sync: None,
            events: None,
        }
    }

    pub fn with_sync(orders: OrderService, sync: SyncService) -> Self {
        Self {
            orders,
            sync: Some(sync),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Move an order to `to`, rejecting transitions out of a terminal
    /// status and self-transitions.
    ///
    /// Entering Shipped pushes the full order document; leaving Shipped
    /// patches the remote status only, so the order keeps a single remote
    /// record across its whole life.
    pub async fn transition(&self, order_id: Uuid, to: OrderStatus) -> AppResult<TransitionReceipt> {
        let order = self.orders.get_order(order_id).await?;
        let from = order.status;

        if !from.can_transition(to) {
            return Err(AppError::InvalidStateTransition(format!(
                "{} -> {}",
                from.as_str(),
                to.as_str()
            )));
        }

        self.orders.set_status(order_id, to).await?;
        let updated = Order { status: to, ..order };

        tracing::info!(%order_id, from = from.as_str(), to = to.as_str(), "order transitioned");

        let remote = match &self.sync {
            Some(sync) if to == OrderStatus::Shipped => {
                let lines = self.orders.line_details(order_id).await?;
                Some(Self::spawn_push(sync.clone(), updated.clone(), move |sync, order| async move {
                    sync.upsert_order(&order, &lines).await
                }))
            }
            Some(sync) if from == OrderStatus::Shipped => Some(Self::spawn_push(
                sync.clone(),
                updated.clone(),
                |sync, order| async move { sync.update_order_status(&order).await },
            )),
            _ => None,
        };

        if to == OrderStatus::Shipped {
            if let Some(events) = &self.events {
                events.publish(StoreEvent::OrderShipped(order_id));
            }
        }

        Ok(TransitionReceipt {
            order: updated,
            remote,
        })
    }

    fn spawn_push<F, Fut>(
        sync: SyncService,
        order: Order,
        push: F,
    ) -> oneshot::Receiver<RemoteOutcome>
    where
        F: FnOnce(SyncService, Order) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = AppResult<()>> + Send,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = match push(sync, order).await {
                Ok(()) => RemoteOutcome::Synced,
                Err(err) => {
                    tracing::warn!(error = %err, "remote order push failed");
                    RemoteOutcome::Failed(err.to_string())
                }
            };
            // The caller may have dropped the receipt.
            let _ = tx.send(outcome);
        });
        rx
    }
}
