use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::user::UserRole;

/// Bearer-token session of an admin or a cashier. Cashier sessions carry their shift.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Uuid,
    pub role: UserRole,
    pub shift_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        role: UserRole,
        shift_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (token, user_id, role, shift_id, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING token, user_id, role, shift_id, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(role)
        .bind(shift_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_token(
        pool: &SqlitePool,
        token: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT token, user_id, role, shift_id, created_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, token: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Drops every session bound to `shift_id`.
    pub async fn delete_by_shift(pool: &SqlitePool, shift_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE shift_id = $1")
            .bind(shift_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
