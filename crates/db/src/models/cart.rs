use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;
use uuid::Uuid;

/// Persisted cart. `items` holds the JSON array of lines owned by the cart service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct StoredCart {
    pub id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub table_number: Option<String>,
    pub items: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredCart {
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, StoredCart>(
            "SELECT id, restaurant_id, table_number, items, updated_at FROM carts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// No-op write that makes the enclosing transaction the writer before it reads.
    pub async fn touch<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE carts SET updated_at = updated_at WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn upsert<'e, E>(
        executor: E,
        id: Uuid,
        restaurant_id: Option<Uuid>,
        table_number: Option<&str>,
        items: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, StoredCart>(
            r#"INSERT INTO carts (id, restaurant_id, table_number, items, updated_at)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(id) DO UPDATE SET
                   restaurant_id = excluded.restaurant_id,
                   table_number = excluded.table_number,
                   items = excluded.items,
                   updated_at = excluded.updated_at
               RETURNING id, restaurant_id, table_number, items, updated_at"#,
        )
        .bind(id)
        .bind(restaurant_id)
        .bind(table_number)
        .bind(items)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
