use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A cashier work session. Open while `end_time` is `None`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Shift {
    pub id: Uuid,
    pub kasir_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Shift {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Worked minutes; an open shift counts up to `now`.
    pub fn minutes_until(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).num_minutes().max(0)
    }

    pub async fn open(
        pool: &SqlitePool,
        id: Uuid,
        kasir_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"INSERT INTO shifts (id, kasir_id, start_time, end_time)
               VALUES ($1, $2, $3, NULL)
               RETURNING id, kasir_id, start_time, end_time"#,
        )
        .bind(id)
        .bind(kasir_id)
        .bind(start_time)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            "SELECT id, kasir_id, start_time, end_time FROM shifts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Most recent open shift of a cashier.
    pub async fn find_open_for_kasir(
        pool: &SqlitePool,
        kasir_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"SELECT id, kasir_id, start_time, end_time
               FROM shifts
               WHERE kasir_id = $1 AND end_time IS NULL
               ORDER BY start_time DESC
               LIMIT 1"#,
        )
        .bind(kasir_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_started_between(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"SELECT id, kasir_id, start_time, end_time
               FROM shifts
               WHERE datetime(start_time) >= datetime($1)
                 AND datetime(start_time) < datetime($2)
               ORDER BY start_time ASC"#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Sets `end_time` on an open shift. Returns `false` if it was already closed.
    pub async fn close(
        pool: &SqlitePool,
        id: Uuid,
        end_time: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE shifts SET end_time = $2 WHERE id = $1 AND end_time IS NULL",
        )
        .bind(id)
        .bind(end_time)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
