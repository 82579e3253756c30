//! Cashier desk: shift login, QR scanning, payment and receipts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson},
    routing::{get, post},
};
use chrono::Utc;
use db::models::{
    order::{Order, OrderStatus},
    shift::Shift,
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::{
    auth::LoginRequest,
    cashier::{CashierService, CashierSession, SalesSummary},
    orders::{OrderDetails, OrderService},
    payment::{ConfirmPayment, PaymentService},
    receipt::{Receipt, ReceiptService},
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::admin::reports::PeriodQuery;
use crate::{DeploymentImpl, error::ApiError, extract::CashierAuth};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ScanRequest {
    /// Decoded QR text.
    pub payload: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

/// Parses an optional `?status=` value; empty or `all` lists everything.
pub fn parse_status_filter(status: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
    match status.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse::<OrderStatus>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("unknown order status: {value}"))),
    }
}

pub async fn login(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<CashierSession>>, ApiError> {
    let session = CashierService::login(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

/// Closes the shift bound to the session
pub async fn logout(
    State(deployment): State<DeploymentImpl>,
    auth: CashierAuth,
) -> Result<ResponseJson<ApiResponse<Option<Shift>>>, ApiError> {
    let shift = CashierService::logout(&deployment.db().pool, &auth.session).await?;
    Ok(ResponseJson(ApiResponse::success(shift)))
}

pub async fn current_shift(
    State(deployment): State<DeploymentImpl>,
    auth: CashierAuth,
) -> Result<ResponseJson<ApiResponse<Shift>>, ApiError> {
    let shift = CashierService::current_shift(&deployment.db().pool, &auth.session).await?;
    Ok(ResponseJson(ApiResponse::success(shift)))
}

pub async fn today_sales(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
) -> Result<ResponseJson<ApiResponse<SalesSummary>>, ApiError> {
    let offset = deployment.config().read().await.local_offset();
    let sales = CashierService::today_sales(&deployment.db().pool, Utc::now(), offset).await?;
    Ok(ResponseJson(ApiResponse::success(sales)))
}

/// Sales over `?period=` (default daily), optionally anchored with `?date=`.
pub async fn period_sales(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<SalesSummary>>, ApiError> {
    let range = query.range(&deployment).await?;
    let sales = CashierService::sales_between(&deployment.db().pool, range).await?;
    Ok(ResponseJson(ApiResponse::success(sales)))
}

pub async fn scan(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
    Json(payload): Json<ScanRequest>,
) -> Result<ResponseJson<ApiResponse<OrderDetails>>, ApiError> {
    let details = OrderService::scan(
        &deployment.db().pool,
        deployment.order_events(),
        &payload.payload,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn list_orders(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
    Query(query): Query<OrderListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Order>>>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let orders = OrderService::list(&deployment.db().pool, status).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

pub async fn get_order(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
    Path(order_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderDetails>>, ApiError> {
    let details = OrderService::details(&deployment.db().pool, order_id).await?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn confirm_payment(
    State(deployment): State<DeploymentImpl>,
    auth: CashierAuth,
    Path(order_id): Path<Uuid>,
    payload: Option<Json<ConfirmPayment>>,
) -> Result<ResponseJson<ApiResponse<Receipt>>, ApiError> {
    let default_method = deployment.config().read().await.default_payment_method.clone();
    let payment_method = payload
        .and_then(|Json(p)| p.payment_method)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or(default_method);

    let receipt = PaymentService::confirm(
        &deployment.db().pool,
        deployment.order_events(),
        &auth.kasir,
        order_id,
        &payment_method,
    )
    .await?;

    deployment
        .track_event(
            "payment_confirmed",
            serde_json::json!({
                "order_id": order_id.to_string(),
                "kasir_id": auth.kasir.id.to_string(),
                "total": receipt.total,
            }),
        )
        .await;

    Ok(ResponseJson(ApiResponse::success(receipt)))
}

/// Printable plain-text receipt of a paid order
pub async fn get_receipt(
    State(deployment): State<DeploymentImpl>,
    _auth: CashierAuth,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = ReceiptService::for_order(&deployment.db().pool, order_id).await?;
    let text = {
        let config = deployment.config().read().await;
        receipt.render_text(
            config.receipt_width,
            &config.receipt_footer,
            config.local_offset(),
        )
    };
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/cashier",
        Router::new()
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/shift", get(current_shift))
            .route("/sales", get(period_sales))
            .route("/sales/today", get(today_sales))
            .route("/scan", post(scan))
            .route("/orders", get(list_orders))
            .route("/orders/{order_id}", get(get_order))
            .route("/orders/{order_id}/confirm", post(confirm_payment))
            .route("/orders/{order_id}/receipt", get(get_receipt)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("scanned")).unwrap(),
            Some(OrderStatus::Scanned)
        );
        assert!(matches!(
            parse_status_filter(Some("paid")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
