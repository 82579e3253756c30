//! Order lookups and status changes shared by customers, cashiers and admins.

use chrono::{DateTime, Utc};
use db::models::{
    order::{Order, OrderStatus},
    order_item::OrderItem,
    restaurant::Restaurant,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use utils::money::sum_amounts;
use uuid::Uuid;

use super::order_events::{OrderEvents, OrderStatusEvent};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("order not found")]
    NotFound,
    #[error("QR code does not contain an order id")]
    InvalidQrPayload,
    #[error("order is {from}, cannot move to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderStatusView {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderStatusView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            updated_at: order.updated_at,
        }
    }
}

/// Order with everything a cashier screen or receipt needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub restaurant_name: Option<String>,
    pub restaurant_location: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
}

/// The text encoded in an order's QR code.
pub fn qr_payload(order_id: Uuid) -> String {
    order_id.to_string()
}

pub fn parse_qr_payload(payload: &str) -> Result<Uuid, OrderError> {
    Uuid::parse_str(payload.trim()).map_err(|_| OrderError::InvalidQrPayload)
}

/// A scan that lost the race to another scan still succeeds.
fn scan_outcome(order_id: Uuid, result: Result<(), OrderError>) -> Result<(), OrderError> {
    match result {
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Scanned,
            ..
        }) => {
            debug!(order_id = %order_id, "Order scanned concurrently");
            Ok(())
        }
        other => other,
    }
}

pub fn order_total(items: &[OrderItem]) -> i64 {
    sum_amounts(items.iter().map(OrderItem::line_total))
}

pub struct OrderService;

impl OrderService {
    pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Order, OrderError> {
        Order::find_by_id(pool, id).await?.ok_or(OrderError::NotFound)
    }

    pub async fn status(pool: &SqlitePool, id: Uuid) -> Result<OrderStatusView, OrderError> {
        Ok(OrderStatusView::from(&Self::get(pool, id).await?))
    }

    pub async fn details(pool: &SqlitePool, id: Uuid) -> Result<OrderDetails, OrderError> {
        let order = Self::get(pool, id).await?;
        let restaurant = Restaurant::find_by_id(pool, order.restaurant_id).await?;
        let items = OrderItem::find_by_order_id(pool, order.id).await?;
        let total_price = order_total(&items);

        Ok(OrderDetails {
            order,
            restaurant_name: restaurant.as_ref().map(|r| r.name.clone()),
            restaurant_location: restaurant.and_then(|r| r.location),
            items,
            total_price,
        })
    }

    pub async fn list(
        pool: &SqlitePool,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(Order::find_all(pool, status).await?)
    }

    /// Marks the order behind a scanned QR code as `scanned`. Scanning twice is harmless.
    pub async fn scan(
        pool: &SqlitePool,
        events: &OrderEvents,
        payload: &str,
    ) -> Result<OrderDetails, OrderError> {
        let order_id = parse_qr_payload(payload)?;
        let order = Self::get(pool, order_id).await?;

        match order.status {
            OrderStatus::Scanned => {
                debug!(order_id = %order_id, "Order already scanned");
            }
            OrderStatus::Pending => {
                let result = Self::transition(pool, events, order_id, OrderStatus::Scanned).await;
                scan_outcome(order_id, result)?;
            }
            from => {
                return Err(OrderError::InvalidTransition {
                    from,
                    to: OrderStatus::Scanned,
                });
            }
        }
        Self::details(pool, order_id).await
    }

    pub async fn cancel(
        pool: &SqlitePool,
        events: &OrderEvents,
        id: Uuid,
    ) -> Result<Order, OrderError> {
        Self::transition(pool, events, id, OrderStatus::Cancelled).await?;
        Self::get(pool, id).await
    }

    /// Compare-and-set transition; publishes the new status on success.
    pub async fn transition(
        pool: &SqlitePool,
        events: &OrderEvents,
        id: Uuid,
        to: OrderStatus,
    ) -> Result<(), OrderError> {
        Self::transition_from(pool, events, id, to.predecessors(), to).await
    }

    /// Transition allowed only out of the statuses in `from`.
    pub async fn transition_from(
        pool: &SqlitePool,
        events: &OrderEvents,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<(), OrderError> {
        if !Order::transition_from(pool, id, from, to).await? {
            let from = Self::get(pool, id).await?.status;
            return Err(OrderError::InvalidTransition { from, to });
        }
        info!(order_id = %id, status = %to, "Order status changed");
        events.publish(OrderStatusEvent::now(id, to));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_menu_item, seed_order, seed_restaurant, test_pool};

    #[test]
    fn test_parse_qr_payload() {
        let id = Uuid::new_v4();
        assert_eq!(parse_qr_payload(&format!("  {id}\n")).unwrap(), id);
        assert_eq!(parse_qr_payload(&qr_payload(id)).unwrap(), id);
        assert!(matches!(
            parse_qr_payload("https://example.com/menu"),
            Err(OrderError::InvalidQrPayload)
        ));
    }

    #[tokio::test]
    async fn test_details_totals_snapshots() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let teh = seed_menu_item(&pool, resto.id, "Es Teh", 5_000).await;
        let order = seed_order(&pool, resto.id, &[(&nasi, 2), (&teh, 3)]).await;

        let details = OrderService::details(&pool, order.id).await.unwrap();
        assert_eq!(details.items.len(), 2);
        assert_eq!(details.total_price, 65_000);
        assert_eq!(details.restaurant_name.as_deref(), Some("Warung Sari"));
        assert_eq!(details.restaurant_location.as_deref(), Some("Jl. Merdeka 1"));
    }

    #[tokio::test]
    async fn test_scan_is_idempotent_and_publishes_once() {
        let pool = test_pool().await;
        let events = OrderEvents::new(8);
        let mut rx = events.subscribe();
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let order = seed_order(&pool, resto.id, &[(&nasi, 1)]).await;

        let scanned = OrderService::scan(&pool, &events, &order.id.to_string())
            .await
            .unwrap();
        assert_eq!(scanned.order.status, OrderStatus::Scanned);
        let again = OrderService::scan(&pool, &events, &order.id.to_string())
            .await
            .unwrap();
        assert_eq!(again.order.status, OrderStatus::Scanned);

        assert_eq!(rx.recv().await.unwrap().status, OrderStatus::Scanned);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_losing_scan_race_counts_as_scanned() {
        let id = Uuid::new_v4();
        assert!(
            scan_outcome(
                id,
                Err(OrderError::InvalidTransition {
                    from: OrderStatus::Scanned,
                    to: OrderStatus::Scanned,
                }),
            )
            .is_ok()
        );
        assert!(matches!(
            scan_outcome(
                id,
                Err(OrderError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Scanned,
                }),
            ),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_scan_rejects_unknown_and_terminal_orders() {
        let pool = test_pool().await;
        let events = OrderEvents::default();
        assert!(matches!(
            OrderService::scan(&pool, &events, &Uuid::new_v4().to_string()).await,
            Err(OrderError::NotFound)
        ));

        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let order = seed_order(&pool, resto.id, &[(&nasi, 1)]).await;
        OrderService::cancel(&pool, &events, order.id).await.unwrap();

        let err = OrderService::scan(&pool, &events, &order.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Cancelled,
                to: OrderStatus::Scanned
            }
        ));
        assert!(matches!(
            OrderService::cancel(&pool, &events, order.id).await,
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = test_pool().await;
        let events = OrderEvents::default();
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let first = seed_order(&pool, resto.id, &[(&nasi, 1)]).await;
        seed_order(&pool, resto.id, &[(&nasi, 2)]).await;
        OrderService::cancel(&pool, &events, first.id).await.unwrap();

        assert_eq!(OrderService::list(&pool, None).await.unwrap().len(), 2);
        let pending = OrderService::list(&pool, Some(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_ne!(pending[0].id, first.id);
    }
}
