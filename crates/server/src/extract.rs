//! Bearer-token extractors for admin and cashier routes.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use db::models::{
    session::Session,
    user::{User, UserRole},
};
use deployment::Deployment;
use services::services::auth::AuthService;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// Parses `Authorization: Bearer <uuid>`.
pub fn bearer_token(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

async fn authenticate(
    parts: &Parts,
    deployment: &DeploymentImpl,
    role: UserRole,
) -> Result<(Session, User), ApiError> {
    let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
    Ok(AuthService::authenticate(&deployment.db().pool, token, role).await?)
}

pub struct AdminAuth {
    pub session: Session,
    pub admin: User,
}

impl FromRequestParts<DeploymentImpl> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let (session, admin) = authenticate(parts, deployment, UserRole::Admin).await?;
        Ok(Self { session, admin })
    }
}

/// Logged-in cashier; the session carries the shift.
pub struct CashierAuth {
    pub session: Session,
    pub kasir: User,
}

impl FromRequestParts<DeploymentImpl> for CashierAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let (session, kasir) = authenticate(parts, deployment, UserRole::Kasir).await?;
        Ok(Self { session, kasir })
    }
}
