//! Customer-side order tracking: polling and a server-sent event stream.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::{
        Json as ResponseJson,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use deployment::Deployment;
use futures_util::{Stream, StreamExt, stream};
use services::services::{
    order_events::OrderStatusEvent,
    orders::{OrderService, OrderStatusView},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub async fn get_order_status(
    State(deployment): State<DeploymentImpl>,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderStatusView>>, ApiError> {
    let status = OrderService::status(&deployment.db().pool, order_id).await?;
    Ok(ResponseJson(ApiResponse::success(status)))
}

/// Current status first, then every change until the client disconnects
pub async fn stream_order_events(
    State(deployment): State<DeploymentImpl>,
    Path(order_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Subscribe before reading so no change slips in between.
    let updates = deployment.order_events().subscribe_order(order_id);
    let current = OrderService::status(&deployment.db().pool, order_id).await?;
    let initial = OrderStatusEvent {
        order_id,
        status: current.status,
        at: current.updated_at,
    };

    let events = stream::once(async move { initial })
        .chain(updates)
        .filter_map(|event| async move {
            let data = serde_json::to_string(&event).ok()?;
            Some(Ok(Event::default().event("status").data(data)))
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/orders",
        Router::new()
            .route("/{order_id}/status", get(get_order_status))
            .route("/{order_id}/events", get(stream_order_events)),
    )
}
