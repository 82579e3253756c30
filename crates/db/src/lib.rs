use std::{str::FromStr, time::Duration};

use sqlx::{
    Error, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::info;

pub mod models;

#[derive(Clone)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Opens (creating if needed) the database at `database_url` and applies pending migrations.
    pub async fn new(database_url: &str) -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(database_url, "Database ready");
        Ok(DBService { pool })
    }

    /// Private in-memory database. A single connection that never expires keeps the data alive.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(DBService { pool })
    }
}

/// True when `err` is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &Error) -> bool {
    matches!(err, Error::Database(db_err) if db_err.is_unique_violation())
}

/// True when `err` is a FOREIGN KEY constraint violation.
pub fn is_foreign_key_violation(err: &Error) -> bool {
    matches!(err, Error::Database(db_err) if db_err.is_foreign_key_violation())
}
