use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::restaurant::{CreateRestaurant, Restaurant, UpdateRestaurant};
use deployment::Deployment;
use services::services::{admin::AdminService, catalog::CatalogService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

pub async fn list_restaurants(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
) -> Result<ResponseJson<ApiResponse<Vec<Restaurant>>>, ApiError> {
    let restaurants = CatalogService::list_restaurants(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(restaurants)))
}

pub async fn get_restaurant(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(restaurant_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Restaurant>>, ApiError> {
    let restaurant = AdminService::get_restaurant(&deployment.db().pool, restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(restaurant)))
}

pub async fn create_restaurant(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Json(payload): Json<CreateRestaurant>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Restaurant>>), ApiError> {
    let restaurant = AdminService::create_restaurant(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(restaurant))))
}

pub async fn update_restaurant(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(restaurant_id): Path<Uuid>,
    Json(payload): Json<UpdateRestaurant>,
) -> Result<ResponseJson<ApiResponse<Restaurant>>, ApiError> {
    let restaurant =
        AdminService::update_restaurant(&deployment.db().pool, restaurant_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(restaurant)))
}

/// Cascades to the restaurant's menu, orders and sales
pub async fn delete_restaurant(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(restaurant_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    AdminService::delete_restaurant(&deployment.db().pool, restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_categories(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(restaurant_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<String>>>, ApiError> {
    let categories = AdminService::menu_categories(&deployment.db().pool, restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/restaurants",
        Router::new()
            .route("/", get(list_restaurants).post(create_restaurant))
            .route(
                "/{restaurant_id}",
                get(get_restaurant)
                    .put(update_restaurant)
                    .delete(delete_restaurant),
            )
            .route("/{restaurant_id}/categories", get(get_categories)),
    )
}
