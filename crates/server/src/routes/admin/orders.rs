use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::order::Order;
use deployment::Deployment;
use services::services::orders::{OrderDetails, OrderService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::AdminAuth,
    routes::cashier::{OrderListQuery, parse_status_filter},
};

pub async fn list_orders(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<OrderListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Order>>>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let orders = OrderService::list(&deployment.db().pool, status).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

pub async fn get_order(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderDetails>>, ApiError> {
    let details = OrderService::details(&deployment.db().pool, order_id).await?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

/// Only pending or scanned orders can be cancelled
pub async fn cancel_order(
    State(deployment): State<DeploymentImpl>,
    auth: AdminAuth,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Order>>, ApiError> {
    let order =
        OrderService::cancel(&deployment.db().pool, deployment.order_events(), order_id).await?;
    deployment
        .track_event(
            "order_cancelled",
            serde_json::json!({
                "order_id": order_id.to_string(),
                "cancelled_by": auth.admin.id.to_string(),
            }),
        )
        .await;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/orders",
        Router::new()
            .route("/", get(list_orders))
            .route("/{order_id}", get(get_order))
            .route("/{order_id}/cancel", post(cancel_order)),
    )
}
