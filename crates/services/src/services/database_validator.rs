//! Startup check that the database carries the schema the services expect

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Tables every service relies on.
pub const REQUIRED_TABLES: &[&str] = &[
    "restaurants",
    "users",
    "menu_items",
    "orders",
    "order_items",
    "shifts",
    "sales_logs",
    "carts",
    "sessions",
];

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database schema incomplete, missing tables: {0}")]
    MissingTables(String),
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check if the database is initialized and every required table exists
    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let migrations_table_exists = self.table_exists("_sqlx_migrations").await?;
        if !migrations_table_exists {
            warn!("Database not initialized - _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                is_initialized: false,
                migrations_applied: 0,
                latest_migration: None,
                missing_tables: self.missing_tables(REQUIRED_TABLES).await?,
            });
        }

        let migrations_applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        let latest_migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        let missing_tables = self.missing_tables(REQUIRED_TABLES).await?;

        info!(
            migrations_applied,
            latest_migration = latest_migration.as_deref().unwrap_or("none"),
            missing = missing_tables.len(),
            "Database validation complete"
        );

        Ok(ValidationResult {
            is_initialized: true,
            migrations_applied: migrations_applied as usize,
            latest_migration,
            missing_tables,
        })
    }

    /// Like [`validate`](Self::validate) but fails on an incomplete schema.
    pub async fn ensure_ready(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let result = self.validate().await?;
        if !result.missing_tables.is_empty() {
            return Err(DatabaseValidationError::MissingTables(
                result.missing_tables.join(", "),
            ));
        }
        Ok(result)
    }

    async fn table_exists(&self, table: &str) -> Result<bool, DatabaseValidationError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn missing_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing_tables = Vec::new();
        for table in required_tables {
            if !self.table_exists(table).await? {
                missing_tables.push(table.to_string());
            }
        }
        Ok(missing_tables)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Database missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("Database OK - {} migrations applied", self.migrations_applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::services::test_support::test_pool;

    #[tokio::test]
    async fn test_migrated_database_is_ready() {
        let validator = DatabaseValidator::new(test_pool().await);
        let result = validator.ensure_ready().await.unwrap();
        assert!(result.is_ok());
        assert!(result.migrations_applied >= 1);
        assert!(result.latest_migration.is_some());
    }

    #[tokio::test]
    async fn test_empty_database_is_not_initialized() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let validator = DatabaseValidator::new(pool);

        let result = validator.validate().await.unwrap();
        assert!(!result.is_initialized);
        assert_eq!(result.missing_tables.len(), REQUIRED_TABLES.len());
        assert!(matches!(
            validator.ensure_ready().await,
            Err(DatabaseValidationError::MissingTables(_))
        ));
    }
}
