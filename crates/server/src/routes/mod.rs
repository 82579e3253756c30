use axum::Router;

use crate::DeploymentImpl;

pub mod admin;
pub mod carts;
pub mod cashier;
pub mod health;
pub mod orders;
pub mod restaurants;

/// The whole `/api` surface, without middleware layers.
pub fn router(deployment: DeploymentImpl) -> Router {
    let api = Router::new()
        .merge(health::router(&deployment))
        .merge(restaurants::router(&deployment))
        .merge(carts::router(&deployment))
        .merge(orders::router(&deployment))
        .merge(cashier::router(&deployment))
        .merge(admin::router(&deployment));

    Router::new().nest("/api", api).with_state(deployment)
}
