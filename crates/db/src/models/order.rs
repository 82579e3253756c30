use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Scanned,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses an order may be in right before moving to `self`.
    pub fn predecessors(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[],
            OrderStatus::Scanned => &[OrderStatus::Pending],
            OrderStatus::Completed | OrderStatus::Cancelled => {
                &[OrderStatus::Pending, OrderStatus::Scanned]
            }
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        next.predecessors().contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_number: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, restaurant_id, table_number, status, created_at, updated_at";

impl Order {
    pub async fn create<'e, E>(
        executor: E,
        id: Uuid,
        restaurant_id: Uuid,
        table_number: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Order>(&format!(
            r#"INSERT INTO orders (id, restaurant_id, table_number, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING {ORDER_COLUMNS}"#
        ))
        .bind(id)
        .bind(restaurant_id)
        .bind(table_number)
        .bind(OrderStatus::Pending)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Newest first, optionally restricted to one status.
    pub async fn find_all(
        pool: &SqlitePool,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        query.push(ORDER_COLUMNS);
        query.push(" FROM orders");
        if let Some(status) = status {
            query.push(" WHERE status = ");
            query.push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<Order>().fetch_all(pool).await
    }

    /// Pending orders created before `cutoff`, oldest first.
    pub async fn find_pending_created_before(
        pool: &SqlitePool,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"SELECT {ORDER_COLUMNS}
               FROM orders
               WHERE status = 'pending'
                 AND datetime(created_at) < datetime($1)
               ORDER BY created_at ASC"#
        ))
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Compare-and-set status change. Returns `false` when the order does not exist or is
    /// not in one of `to`'s predecessor statuses.
    pub async fn transition<'e, E>(
        executor: E,
        id: Uuid,
        to: OrderStatus,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Self::transition_from(executor, id, to.predecessors(), to).await
    }

    /// Like [`Order::transition`], but only from the statuses in `from` that may precede `to`.
    pub async fn transition_from<'e, E>(
        executor: E,
        id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let from: Vec<OrderStatus> = from
            .iter()
            .copied()
            .filter(|status| status.can_transition_to(to))
            .collect();
        if from.is_empty() {
            return Ok(false);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE orders SET status = ");
        query.push_bind(to);
        query.push(", updated_at = ");
        query.push_bind(Utc::now());
        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND status IN (");
        let mut statuses = query.separated(", ");
        for status in from {
            statuses.push_bind(status);
        }
        statuses.push_unseparated(")");

        let result = query.build().execute(executor).await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await
    }

    pub async fn count_by_restaurant(
        pool: &SqlitePool,
        restaurant_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .fetch_one(pool)
            .await
    }
}
