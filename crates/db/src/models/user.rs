use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Kasir,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_salt: String,
    pub role: UserRole,
    pub restaurant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: UserRole,
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub restaurant_id: Option<Uuid>,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
}

/// Cashier row for admin listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CashierWithRestaurant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub restaurant_id: Option<Uuid>,
    pub restaurant_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, password_salt, role, restaurant_id, created_at, updated_at";

impl User {
    pub async fn create(pool: &SqlitePool, id: Uuid, data: &CreateUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"INSERT INTO users (id, name, email, password_hash, password_salt, role, restaurant_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.password_salt)
        .bind(data.role)
        .bind(data.restaurant_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id_and_role(
        pool: &SqlitePool,
        id: Uuid,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_role(pool: &SqlitePool, role: UserRole) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY name ASC"
        ))
        .bind(role)
        .fetch_all(pool)
        .await
    }

    pub async fn find_cashiers_with_restaurant(
        pool: &SqlitePool,
    ) -> Result<Vec<CashierWithRestaurant>, sqlx::Error> {
        sqlx::query_as::<_, CashierWithRestaurant>(
            r#"SELECT u.id, u.name, u.email, u.restaurant_id, r.name AS restaurant_name, u.created_at
               FROM users u
               LEFT JOIN restaurants r ON r.id = u.restaurant_id
               WHERE u.role = 'kasir'
               ORDER BY u.created_at DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Partial update restricted to users with `role`.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        role: UserRole,
        data: &UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET name = COALESCE($3, name),
                   email = COALESCE($4, email),
                   restaurant_id = COALESCE($5, restaurant_id),
                   password_hash = COALESCE($6, password_hash),
                   password_salt = COALESCE($7, password_salt),
                   updated_at = $8
               WHERE id = $1 AND role = $2
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(role)
        .bind(&data.name)
        .bind(&data.email)
        .bind(data.restaurant_id)
        .bind(&data.password_hash)
        .bind(&data.password_salt)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid, role: UserRole) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
