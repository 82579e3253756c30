use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MenuItem {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMenuItem {
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub price: i64,
    pub image_url: Option<String>,
    pub is_available: Option<bool>, // defaults to true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateMenuItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

/// Filter for listing a restaurant's menu.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter<'a> {
    pub available_only: bool,
    pub category: Option<&'a str>,
}

const MENU_ITEM_COLUMNS: &str = "id, restaurant_id, name, description, category, price, image_url, is_available, created_at, updated_at";

impl MenuItem {
    pub async fn find_by_restaurant(
        pool: &SqlitePool,
        restaurant_id: Uuid,
        filter: &MenuFilter<'_>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        query.push(MENU_ITEM_COLUMNS);
        query.push(" FROM menu_items WHERE restaurant_id = ");
        query.push_bind(restaurant_id);
        if filter.available_only {
            query.push(" AND is_available = 1");
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ");
            query.push_bind(category.to_string());
        }
        query.push(" ORDER BY category ASC, name ASC");

        query.build_query_as::<MenuItem>().fetch_all(pool).await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Distinct categories of a restaurant, sorted.
    pub async fn categories(
        pool: &SqlitePool,
        restaurant_id: Uuid,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"SELECT DISTINCT category
               FROM menu_items
               WHERE restaurant_id = $1
               ORDER BY category ASC"#,
        )
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateMenuItem,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            r#"INSERT INTO menu_items (id, restaurant_id, name, description, category, price, image_url, is_available, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING {MENU_ITEM_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.restaurant_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.price)
        .bind(&data.image_url)
        .bind(data.is_available.unwrap_or(true))
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateMenuItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MenuItem>(&format!(
            r#"UPDATE menu_items
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   category = COALESCE($4, category),
                   price = COALESCE($5, price),
                   image_url = COALESCE($6, image_url),
                   is_available = COALESCE($7, is_available),
                   updated_at = $8
               WHERE id = $1
               RETURNING {MENU_ITEM_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.price)
        .bind(&data.image_url)
        .bind(data.is_available)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_items")
            .fetch_one(pool)
            .await
    }
}
