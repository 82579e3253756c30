use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::user::User;
use deployment::Deployment;
use services::services::auth::{AdminLoginResponse, AuthService, LoginRequest, RegisterAdmin};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

pub async fn login(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AdminLoginResponse>>, ApiError> {
    let response = AuthService::login_admin(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(response)))
}

pub async fn register(
    State(deployment): State<DeploymentImpl>,
    Json(payload): Json<RegisterAdmin>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    let user = AuthService::register_admin(&deployment.db().pool, &payload).await?;
    deployment
        .track_event(
            "admin_registered",
            serde_json::json!({ "user_id": user.id.to_string() }),
        )
        .await;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(user))))
}

pub async fn logout(
    State(deployment): State<DeploymentImpl>,
    auth: AdminAuth,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    AuthService::logout(&deployment.db().pool, auth.session.token).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn me(auth: AdminAuth) -> ResponseJson<ApiResponse<User>> {
    ResponseJson(ApiResponse::success(auth.admin))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
