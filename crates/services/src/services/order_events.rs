//! In-process broadcast of order status changes, consumed by the SSE endpoint.

use chrono::{DateTime, Utc};
use db::models::order::OrderStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::trace;
use ts_rs::TS;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct OrderStatusEvent {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
}

impl OrderStatusEvent {
    pub fn now(order_id: Uuid, status: OrderStatus) -> Self {
        Self {
            order_id,
            status,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderEvents {
    sender: broadcast::Sender<OrderStatusEvent>,
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl OrderEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fire and forget; nobody listening is not an error.
    pub fn publish(&self, event: OrderStatusEvent) {
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        trace!(order_id = %event.order_id, status = %event.status, receivers, "Published order event");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderStatusEvent> {
        self.sender.subscribe()
    }

    /// Events of one order. Lagged receivers skip what they missed.
    pub fn subscribe_order(&self, order_id: Uuid) -> impl Stream<Item = OrderStatusEvent> + use<> {
        BroadcastStream::new(self.subscribe()).filter_map(move |event| match event {
            Ok(event) if event.order_id == order_id => Some(event),
            _ => None,
        })
    }
}
