use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Written when a cashier finalizes an order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SalesLog {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kasir_id: Uuid,
    pub shift_id: Uuid,
    pub total_price: i64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSalesLog {
    pub order_id: Uuid,
    pub kasir_id: Uuid,
    pub shift_id: Uuid,
    pub total_price: i64,
    pub payment_method: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SalesLogWithCashier {
    pub id: Uuid,
    pub order_id: Uuid,
    pub kasir_id: Uuid,
    pub cashier_name: Option<String>,
    pub table_number: Option<String>,
    pub total_price: i64,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl SalesLog {
    pub async fn create<'e, E>(executor: E, data: &CreateSalesLog) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, SalesLog>(
            r#"INSERT INTO sales_logs (id, order_id, kasir_id, shift_id, total_price, payment_method, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id, order_id, kasir_id, shift_id, total_price, payment_method, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.order_id)
        .bind(data.kasir_id)
        .bind(data.shift_id)
        .bind(data.total_price)
        .bind(&data.payment_method)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_id(
        pool: &SqlitePool,
        order_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SalesLog>(
            r#"SELECT id, order_id, kasir_id, shift_id, total_price, payment_method, created_at
               FROM sales_logs
               WHERE order_id = $1"#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_by_kasir(pool: &SqlitePool, kasir_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales_logs WHERE kasir_id = $1")
            .bind(kasir_id)
            .fetch_one(pool)
            .await
    }

    /// Sales in `[from, to)`, newest first, optionally for one cashier.
    pub async fn find_between(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        kasir_id: Option<Uuid>,
    ) -> Result<Vec<SalesLogWithCashier>, sqlx::Error> {
        sqlx::query_as::<_, SalesLogWithCashier>(
            r#"SELECT sl.id, sl.order_id, sl.kasir_id, u.name AS cashier_name,
                      o.table_number, sl.total_price, sl.payment_method, sl.created_at
               FROM sales_logs sl
               LEFT JOIN users u ON u.id = sl.kasir_id
               LEFT JOIN orders o ON o.id = sl.order_id
               WHERE datetime(sl.created_at) >= datetime($1)
                 AND datetime(sl.created_at) < datetime($2)
                 AND ($3 IS NULL OR sl.kasir_id = $3)
               ORDER BY sl.created_at DESC"#,
        )
        .bind(from)
        .bind(to)
        .bind(kasir_id)
        .fetch_all(pool)
        .await
    }
}
