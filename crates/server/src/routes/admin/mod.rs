//! Back-office API. Everything except login and registration needs an admin session.

use axum::Router;

use crate::DeploymentImpl;

pub mod auth;
pub mod cashiers;
pub mod export;
pub mod menu_items;
pub mod orders;
pub mod reports;
pub mod restaurants;

pub fn router(deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    let admin = Router::new()
        .merge(auth::router(deployment))
        .merge(restaurants::router(deployment))
        .merge(menu_items::router(deployment))
        .merge(cashiers::router(deployment))
        .merge(orders::router(deployment))
        .merge(reports::router(deployment))
        .merge(export::router(deployment));

    Router::new().nest("/admin", admin)
}
