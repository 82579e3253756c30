//! Background sweeper cancelling pending orders that were never scanned or paid.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use db::{
    DBService,
    models::order::{Order, OrderStatus},
};
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use super::{
    order_events::OrderEvents,
    orders::{OrderError, OrderService},
};

#[derive(Debug, Error)]
pub enum StaleOrderError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Background service for cancelling stale pending orders
pub struct StaleOrderService {
    db: DBService,
    events: OrderEvents,
    poll_interval: Duration,
    pending_timeout_minutes: i64,
}

impl StaleOrderService {
    pub fn new(
        db: DBService,
        events: OrderEvents,
        poll_interval: Duration,
        pending_timeout_minutes: i64,
    ) -> Self {
        Self {
            db,
            events,
            poll_interval,
            pending_timeout_minutes,
        }
    }

    /// Spawns the sweeper. Returns `None` when the timeout is disabled (0 minutes).
    pub fn spawn(self) -> Option<tokio::task::JoinHandle<()>> {
        if self.pending_timeout_minutes <= 0 {
            info!("Stale order sweeper disabled");
            return None;
        }
        Some(tokio::spawn(async move {
            self.start().await;
        }))
    }

    async fn start(&self) {
        info!(
            "Starting stale order sweeper with interval {:?}, pending timeout: {} min",
            self.poll_interval, self.pending_timeout_minutes
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = self.sweep_once().await {
                error!("Error sweeping stale orders: {}", e);
            }
        }
    }

    /// Cancels every pending order older than the timeout. Returns how many were cancelled.
    pub async fn sweep_once(&self) -> Result<usize, StaleOrderError> {
        let Some(cutoff) = TimeDelta::try_minutes(self.pending_timeout_minutes)
            .and_then(|timeout| Utc::now().checked_sub_signed(timeout))
        else {
            warn!(
                minutes = self.pending_timeout_minutes,
                "Pending timeout out of range, skipping sweep"
            );
            return Ok(0);
        };
        let stale = Order::find_pending_created_before(&self.db.pool, cutoff).await?;

        if stale.is_empty() {
            debug!("Stale order sweep: nothing to cancel");
            return Ok(0);
        }
        self.cancel_pending(stale).await
    }

    /// Cancels the given orders if they are still pending.
    async fn cancel_pending(&self, stale: Vec<Order>) -> Result<usize, StaleOrderError> {
        let mut cancelled = 0;
        for order in stale {
            match OrderService::transition_from(
                &self.db.pool,
                &self.events,
                order.id,
                &[OrderStatus::Pending],
                OrderStatus::Cancelled,
            )
            .await
            {
                Ok(()) => {
                    info!(
                        order_id = %order.id,
                        restaurant_id = %order.restaurant_id,
                        created_at = %order.created_at,
                        "Stale order cancelled"
                    );
                    cancelled += 1;
                }
                // Scanned or paid between the query and the update.
                Err(OrderError::InvalidTransition { from, .. }) => {
                    debug!(order_id = %order.id, status = %from, "Stale order moved on, skipping");
                }
                Err(OrderError::Database(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Could not cancel stale order");
                }
            }
        }

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::services::test_support::seed_restaurant;

    async fn service(timeout_minutes: i64) -> (StaleOrderService, OrderEvents) {
        let db = DBService::new_in_memory().await.unwrap();
        let events = OrderEvents::new(8);
        let service = StaleOrderService::new(
            db,
            events.clone(),
            Duration::from_secs(60),
            timeout_minutes,
        );
        (service, events)
    }

    async fn status(pool: &sqlx::SqlitePool, id: Uuid) -> OrderStatus {
        Order::find_by_id(pool, id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_sweep_cancels_only_old_pending_orders() {
        let (service, events) = service(30).await;
        let mut rx = events.subscribe();
        let pool = &service.db.pool;
        let resto = seed_restaurant(pool, "Warung Sari").await;

        let old = Order::create(pool, Uuid::new_v4(), resto.id, Some("1"))
            .await
            .unwrap();
        let old_scanned = Order::create(pool, Uuid::new_v4(), resto.id, Some("2"))
            .await
            .unwrap();
        Order::transition(pool, old_scanned.id, OrderStatus::Scanned)
            .await
            .unwrap();
        let fresh = Order::create(pool, Uuid::new_v4(), resto.id, Some("3"))
            .await
            .unwrap();

        let an_hour_ago = Utc::now() - TimeDelta::hours(1);
        sqlx::query("UPDATE orders SET created_at = $1 WHERE id IN ($2, $3)")
            .bind(an_hour_ago)
            .bind(old.id)
            .bind(old_scanned.id)
            .execute(pool)
            .await
            .unwrap();

        assert_eq!(service.sweep_once().await.unwrap(), 1);

        assert_eq!(status(pool, old.id).await, OrderStatus::Cancelled);
        assert_eq!(status(pool, old_scanned.id).await, OrderStatus::Scanned);
        assert_eq!(status(pool, fresh.id).await, OrderStatus::Pending);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.order_id, old.id);
        assert_eq!(event.status, OrderStatus::Cancelled);

        assert_eq!(service.sweep_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_order_scanned_after_selection_is_kept() {
        let (service, events) = service(30).await;
        let pool = &service.db.pool;
        let resto = seed_restaurant(pool, "Warung Sari").await;
        let order = Order::create(pool, Uuid::new_v4(), resto.id, Some("5"))
            .await
            .unwrap();

        let selected = Order::find_pending_created_before(pool, Utc::now() + TimeDelta::hours(1))
            .await
            .unwrap();
        assert_eq!(selected.len(), 1);
        OrderService::scan(pool, &events, &order.id.to_string())
            .await
            .unwrap();

        assert_eq!(service.cancel_pending(selected).await.unwrap(), 0);
        assert_eq!(status(pool, order.id).await, OrderStatus::Scanned);
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_skips_sweep() {
        let (service, _) = service(i64::MAX).await;
        let resto = seed_restaurant(&service.db.pool, "Warung Sari").await;
        Order::create(&service.db.pool, Uuid::new_v4(), resto.id, Some("1"))
            .await
            .unwrap();
        assert_eq!(service.sweep_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disabled_sweeper_does_not_spawn() {
        let (service, _) = service(0).await;
        assert!(service.spawn().is_none());
    }
}
