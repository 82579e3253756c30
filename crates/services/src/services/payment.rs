//! Cashier payment confirmation: sales log + order completion in one transaction.

use db::{
    is_unique_violation,
    models::{
        order::{Order, OrderStatus},
        sales_log::{CreateSalesLog, SalesLog},
        shift::Shift,
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    order_events::{OrderEvents, OrderStatusEvent},
    orders::{OrderError, OrderService},
    receipt::Receipt,
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("cashier has no open shift")]
    NoOpenShift,
    #[error("order total must be greater than zero")]
    EmptyOrder,
    #[error("order is already paid")]
    AlreadySettled,
    #[error("order is {0} and cannot be paid")]
    NotPayable(OrderStatus),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct ConfirmPayment {
    pub payment_method: Option<String>,
}

pub struct PaymentService;

impl PaymentService {
    /// Settles `order_id` on the cashier's open shift and returns the receipt.
    pub async fn confirm(
        pool: &SqlitePool,
        events: &OrderEvents,
        kasir: &User,
        order_id: Uuid,
        payment_method: &str,
    ) -> Result<Receipt, PaymentError> {
        let shift = Shift::find_open_for_kasir(pool, kasir.id)
            .await?
            .ok_or(PaymentError::NoOpenShift)?;

        let mut details = OrderService::details(pool, order_id).await?;
        match details.order.status {
            OrderStatus::Pending | OrderStatus::Scanned => {}
            OrderStatus::Completed => return Err(PaymentError::AlreadySettled),
            status => return Err(PaymentError::NotPayable(status)),
        }
        if details.total_price <= 0 {
            return Err(PaymentError::EmptyOrder);
        }

        let mut tx = pool.begin().await?;
        let sale = SalesLog::create(
            &mut *tx,
            &CreateSalesLog {
                order_id,
                kasir_id: kasir.id,
                shift_id: shift.id,
                total_price: details.total_price,
                payment_method: payment_method.to_string(),
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PaymentError::AlreadySettled
            } else {
                PaymentError::Database(e)
            }
        })?;

        if !Order::transition(&mut *tx, order_id, OrderStatus::Completed).await? {
            warn!(order_id = %order_id, "Order changed during payment, rolling back");
            tx.rollback().await?;
            return Err(PaymentError::AlreadySettled);
        }
        tx.commit().await?;

        info!(
            order_id = %order_id,
            kasir_id = %kasir.id,
            shift_id = %shift.id,
            total_price = sale.total_price,
            payment_method = %sale.payment_method,
            "Payment confirmed"
        );
        events.publish(OrderStatusEvent::now(order_id, OrderStatus::Completed));

        details.order.status = OrderStatus::Completed;
        Ok(Receipt::from_sale(details, &sale, kasir.name.clone()))
    }
}
