use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A line of an order. Name and price are copied from the menu when the order is placed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Option<Uuid>, // nulled when the menu item is deleted
    pub name_snapshot: String,
    pub price_snapshot: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.price_snapshot.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CreateOrderItem {
    pub menu_item_id: Uuid,
    pub name_snapshot: String,
    pub price_snapshot: i64,
    pub quantity: i32,
}

/// Order item joined with the completion time of its sale.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SoldItem {
    pub menu_item_id: Option<Uuid>,
    pub name_snapshot: String,
    pub price_snapshot: i64,
    pub quantity: i32,
    pub sold_at: DateTime<Utc>,
}

impl OrderItem {
    pub async fn create<'e, E>(
        executor: E,
        order_id: Uuid,
        data: &CreateOrderItem,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, OrderItem>(
            r#"INSERT INTO order_items (id, order_id, menu_item_id, name_snapshot, price_snapshot, quantity)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, order_id, menu_item_id, name_snapshot, price_snapshot, quantity"#,
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(data.menu_item_id)
        .bind(&data.name_snapshot)
        .bind(data.price_snapshot)
        .bind(data.quantity)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_id<'e, E>(
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, OrderItem>(
            r#"SELECT id, order_id, menu_item_id, name_snapshot, price_snapshot, quantity
               FROM order_items
               WHERE order_id = $1
               ORDER BY rowid ASC"#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await
    }

    /// Items of orders whose sale was logged in `[from, to)`.
    pub async fn find_sold_between(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SoldItem>, sqlx::Error> {
        sqlx::query_as::<_, SoldItem>(
            r#"SELECT oi.menu_item_id, oi.name_snapshot, oi.price_snapshot, oi.quantity,
                      sl.created_at AS sold_at
               FROM order_items oi
               JOIN sales_logs sl ON sl.order_id = oi.order_id
               WHERE datetime(sl.created_at) >= datetime($1)
                 AND datetime(sl.created_at) < datetime($2)
               ORDER BY sl.created_at ASC"#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
