use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::menu_item::{CreateMenuItem, MenuItem, UpdateMenuItem};
use deployment::Deployment;
use serde::Deserialize;
use services::services::admin::AdminService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

#[derive(Debug, Deserialize)]
pub struct MenuItemQuery {
    pub restaurant_id: Option<Uuid>,
}

/// Includes unavailable items
pub async fn list_menu_items(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<MenuItemQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MenuItem>>>, ApiError> {
    let items = AdminService::list_menu_items(&deployment.db().pool, query.restaurant_id).await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

pub async fn get_menu_item(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(menu_item_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<MenuItem>>, ApiError> {
    let item = AdminService::get_menu_item(&deployment.db().pool, menu_item_id).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

pub async fn create_menu_item(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Json(payload): Json<CreateMenuItem>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<MenuItem>>), ApiError> {
    let item = AdminService::create_menu_item(&deployment.db().pool, &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(item))))
}

pub async fn update_menu_item(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(menu_item_id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItem>,
) -> Result<ResponseJson<ApiResponse<MenuItem>>, ApiError> {
    let item =
        AdminService::update_menu_item(&deployment.db().pool, menu_item_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

pub async fn delete_menu_item(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(menu_item_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    AdminService::delete_menu_item(&deployment.db().pool, menu_item_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/menu-items",
        Router::new()
            .route("/", get(list_menu_items).post(create_menu_item))
            .route(
                "/{menu_item_id}",
                get(get_menu_item)
                    .put(update_menu_item)
                    .delete(delete_menu_item),
            ),
    )
}
