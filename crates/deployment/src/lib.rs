use std::sync::Arc;

use async_trait::async_trait;
use db::DBService;
use serde_json::Value;
use services::services::{
    config::{Config, ConfigError},
    database_validator::DatabaseValidationError,
    order_events::OrderEvents,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    DatabaseValidation(#[from] DatabaseValidationError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// What the HTTP layer needs from a running instance.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn db(&self) -> &DBService;

    fn config(&self) -> &Arc<RwLock<Config>>;

    fn order_events(&self) -> &OrderEvents;

    /// Records a business event in the log.
    async fn track_event(&self, event_name: &str, properties: Value) {
        info!(event = event_name, %properties, "Tracked event");
    }
}
