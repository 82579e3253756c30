use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::{CashierWithRestaurant, User};
use deployment::Deployment;
use services::services::admin::{AdminService, CreateCashier, UpdateCashier};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

pub async fn list_cashiers(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
) -> Result<ResponseJson<ApiResponse<Vec<CashierWithRestaurant>>>, ApiError> {
    let cashiers = AdminService::list_cashiers(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(cashiers)))
}

pub async fn get_cashier(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(kasir_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let kasir = AdminService::get_cashier(&deployment.db().pool, kasir_id).await?;
    Ok(ResponseJson(ApiResponse::success(kasir)))
}

pub async fn create_cashier(
    State(deployment): State<DeploymentImpl>,
    auth: AdminAuth,
    Json(payload): Json<CreateCashier>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    let kasir = AdminService::create_cashier(&deployment.db().pool, &payload).await?;
    deployment
        .track_event(
            "cashier_created",
            serde_json::json!({
                "kasir_id": kasir.id.to_string(),
                "created_by": auth.admin.id.to_string(),
            }),
        )
        .await;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(kasir))))
}

pub async fn update_cashier(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(kasir_id): Path<Uuid>,
    Json(payload): Json<UpdateCashier>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let kasir = AdminService::update_cashier(&deployment.db().pool, kasir_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(kasir)))
}

pub async fn delete_cashier(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Path(kasir_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    AdminService::delete_cashier(&deployment.db().pool, kasir_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/cashiers",
        Router::new()
            .route("/", get(list_cashiers).post(create_cashier))
            .route(
                "/{kasir_id}",
                get(get_cashier).put(update_cashier).delete(delete_cashier),
            ),
    )
}
