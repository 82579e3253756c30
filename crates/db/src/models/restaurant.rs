use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateRestaurant {
    pub name: String,
    pub location: Option<String>,
    pub logo_url: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateRestaurant {
    pub name: Option<String>,
    pub location: Option<String>,
    pub logo_url: Option<String>,
}

impl Restaurant {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"SELECT id, name, location, logo_url, created_at, updated_at
               FROM restaurants
               ORDER BY created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"SELECT id, name, location, logo_url, created_at, updated_at
               FROM restaurants
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateRestaurant,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Restaurant>(
            r#"INSERT INTO restaurants (id, name, location, logo_url, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING id, name, location, logo_url, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.location)
        .bind(&data.logo_url)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateRestaurant,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(
            r#"UPDATE restaurants
               SET name = COALESCE($2, name),
                   location = COALESCE($3, location),
                   logo_url = COALESCE($4, logo_url),
                   updated_at = $5
               WHERE id = $1
               RETURNING id, name, location, logo_url, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.location)
        .bind(&data.logo_url)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM restaurants")
            .fetch_one(pool)
            .await
    }
}
