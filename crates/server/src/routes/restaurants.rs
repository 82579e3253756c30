//! Customer menu browsing.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{menu_item::MenuItem, restaurant::Restaurant};
use deployment::Deployment;
use serde::Deserialize;
use services::services::catalog::CatalogService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

pub async fn list_restaurants(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Restaurant>>>, ApiError> {
    let restaurants = CatalogService::list_restaurants(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(restaurants)))
}

pub async fn get_restaurant(
    State(deployment): State<DeploymentImpl>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Restaurant>>, ApiError> {
    let restaurant = CatalogService::get_restaurant(&deployment.db().pool, restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(restaurant)))
}

/// Available items only; `?category=` narrows, `all` means everything
pub async fn get_menu(
    State(deployment): State<DeploymentImpl>,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<MenuQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MenuItem>>>, ApiError> {
    let menu = CatalogService::list_menu(
        &deployment.db().pool,
        restaurant_id,
        query.category.as_deref(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(menu)))
}

pub async fn get_categories(
    State(deployment): State<DeploymentImpl>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<String>>>, ApiError> {
    let categories = CatalogService::list_categories(&deployment.db().pool, restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/restaurants",
        Router::new()
            .route("/", get(list_restaurants))
            .route("/{restaurant_id}", get(get_restaurant))
            .route("/{restaurant_id}/menu", get(get_menu))
            .route("/{restaurant_id}/categories", get(get_categories)),
    )
}
