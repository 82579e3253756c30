//! Customer cart and checkout. Clients keep the cart id returned by `POST /carts`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::{
    cart::{CartService, CartView},
    checkout::{CheckoutService, PlacedOrder},
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AddCartItem {
    pub menu_item_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCartItem {
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetTable {
    pub table_number: String,
}

pub async fn create_cart(
    State(deployment): State<DeploymentImpl>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<CartView>>), ApiError> {
    let cart = CartService::create(&deployment.db().pool).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(cart.into()))))
}

pub async fn get_cart(
    State(deployment): State<DeploymentImpl>,
    Path(cart_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CartView>>, ApiError> {
    let cart = CartService::load(&deployment.db().pool, cart_id).await?;
    Ok(ResponseJson(ApiResponse::success(cart.into())))
}

pub async fn add_item(
    State(deployment): State<DeploymentImpl>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<AddCartItem>,
) -> Result<ResponseJson<ApiResponse<CartView>>, ApiError> {
    let cart = CartService::add_item(&deployment.db().pool, cart_id, payload.menu_item_id).await?;
    Ok(ResponseJson(ApiResponse::success(cart.into())))
}

pub async fn update_item(
    State(deployment): State<DeploymentImpl>,
    Path((cart_id, menu_item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItem>,
) -> Result<ResponseJson<ApiResponse<CartView>>, ApiError> {
    let cart = CartService::update_quantity(
        &deployment.db().pool,
        cart_id,
        menu_item_id,
        payload.quantity,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(cart.into())))
}

pub async fn remove_item(
    State(deployment): State<DeploymentImpl>,
    Path((cart_id, menu_item_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<CartView>>, ApiError> {
    let cart = CartService::remove_item(&deployment.db().pool, cart_id, menu_item_id).await?;
    Ok(ResponseJson(ApiResponse::success(cart.into())))
}

pub async fn set_table(
    State(deployment): State<DeploymentImpl>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<SetTable>,
) -> Result<ResponseJson<ApiResponse<CartView>>, ApiError> {
    let cart = CartService::set_table(&deployment.db().pool, cart_id, &payload.table_number).await?;
    Ok(ResponseJson(ApiResponse::success(cart.into())))
}

/// Submits the cart as a pending order and empties it
pub async fn checkout(
    State(deployment): State<DeploymentImpl>,
    Path(cart_id): Path<Uuid>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<PlacedOrder>>), ApiError> {
    let placed =
        CheckoutService::checkout(&deployment.db().pool, deployment.order_events(), cart_id)
            .await?;

    deployment
        .track_event(
            "order_placed",
            serde_json::json!({
                "order_id": placed.order_id.to_string(),
                "restaurant_id": placed.restaurant_id.to_string(),
                "total_price": placed.total_price,
            }),
        )
        .await;

    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(placed))))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/carts",
        Router::new()
            .route("/", post(create_cart))
            .route("/{cart_id}", get(get_cart))
            .route("/{cart_id}/items", post(add_item))
            .route("/{cart_id}/items/{menu_item_id}", put(update_item).delete(remove_item))
            .route("/{cart_id}/table", put(set_table))
            .route("/{cart_id}/checkout", post(checkout)),
    )
}
