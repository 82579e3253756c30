use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    config::{Config, load_config},
    database_validator::DatabaseValidator,
    order_events::OrderEvents,
    stale_orders::StaleOrderService,
};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::info;

/// Single-node deployment: one SQLite file, in-process order events.
#[derive(Clone)]
pub struct LocalDeployment {
    db: DBService,
    config: Arc<RwLock<Config>>,
    order_events: OrderEvents,
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = load_config()?;
        let db = DBService::new(&config.database_url).await?;
        let deployment = Self::with_db(db, config).await?;
        deployment.spawn_stale_order_sweeper().await;
        Ok(deployment)
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    fn order_events(&self) -> &OrderEvents {
        &self.order_events
    }
}

impl LocalDeployment {
    /// Wraps an already migrated database. Used directly by tests.
    pub async fn with_db(db: DBService, config: Config) -> Result<Self, DeploymentError> {
        let validation = DatabaseValidator::new(db.pool.clone()).ensure_ready().await?;
        info!("{}", validation.summary());

        Ok(Self {
            db,
            config: Arc::new(RwLock::new(config)),
            order_events: OrderEvents::default(),
        })
    }

    pub async fn spawn_stale_order_sweeper(&self) -> Option<JoinHandle<()>> {
        let config = self.config.read().await;
        StaleOrderService::new(
            self.db.clone(),
            self.order_events.clone(),
            Duration::from_secs(config.sweep_interval_secs.max(1)),
            config.pending_order_timeout_minutes,
        )
        .spawn()
    }
}
