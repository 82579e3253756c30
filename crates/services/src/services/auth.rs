//! Table-lookup authentication for admins and cashiers, with bearer-token sessions.

use db::{
    is_unique_violation,
    models::{
        session::Session,
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("email not found")]
    UnknownEmail,
    #[error("wrong password")]
    InvalidCredentials,
    #[error("missing or invalid session")]
    Unauthorized,
    #[error("session does not grant {0} access")]
    Forbidden(UserRole),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RegisterAdmin {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AdminLoginResponse {
    pub token: Uuid,
    pub user: User,
}

/// Salted SHA-256, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let hash = digest(&salt, password);
        Self { hash, salt }
    }

    pub fn verify(hash: &str, salt: &str, password: &str) -> bool {
        digest(salt, password) == hash
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Trims and lowercases; rejects anything without an `@`.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AuthError::Validation(format!("invalid email address: {email}")));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub struct AuthService;

impl AuthService {
    /// Looks the user up by email within `role` and checks the password.
    pub async fn verify_credentials(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        let user = User::find_by_email(pool, &email)
            .await?
            .filter(|user| user.role == role)
            .ok_or(AuthError::UnknownEmail)?;

        if !PasswordHash::verify(&user.password_hash, &user.password_salt, password) {
            warn!(user_id = %user.id, role = %role, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn login_admin(
        pool: &SqlitePool,
        request: &LoginRequest,
    ) -> Result<AdminLoginResponse, AuthError> {
        let user =
            Self::verify_credentials(pool, &request.email, &request.password, UserRole::Admin)
                .await?;
        let session = Session::create(pool, user.id, UserRole::Admin, None).await?;
        info!(user_id = %user.id, "Admin logged in");
        Ok(AdminLoginResponse {
            token: session.token,
            user,
        })
    }

    pub async fn register_admin(pool: &SqlitePool, data: &RegisterAdmin) -> Result<User, AuthError> {
        let email = normalize_email(&data.email)?;
        if data.password != data.confirm_password {
            return Err(AuthError::Validation("passwords do not match".to_string()));
        }
        validate_password(&data.password)?;

        let name = data
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Admin")
            .to_string();
        let password = PasswordHash::new(&data.password);
        let user = User::create(
            pool,
            Uuid::new_v4(),
            &CreateUser {
                name,
                email: email.clone(),
                password_hash: password.hash,
                password_salt: password.salt,
                role: UserRole::Admin,
                restaurant_id: None,
            },
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken(email.clone())
            } else {
                AuthError::Database(e)
            }
        })?;

        info!(user_id = %user.id, "Admin registered");
        Ok(user)
    }

    /// Resolves a bearer token to its session and user, requiring `role`.
    pub async fn authenticate(
        pool: &SqlitePool,
        token: Uuid,
        role: UserRole,
    ) -> Result<(Session, User), AuthError> {
        let session = Session::find_by_token(pool, token)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if session.role != role {
            return Err(AuthError::Forbidden(role));
        }
        let user = User::find_by_id_and_role(pool, session.user_id, role)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        Ok((session, user))
    }

    pub async fn logout(pool: &SqlitePool, token: Uuid) -> Result<(), AuthError> {
        Session::delete(pool, token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_admin, test_pool};

    #[test]
    fn test_password_hash_roundtrip() {
        let stored = PasswordHash::new("rahasia123");
        assert!(PasswordHash::verify(&stored.hash, &stored.salt, "rahasia123"));
        assert!(!PasswordHash::verify(&stored.hash, &stored.salt, "rahasia124"));
        assert_ne!(PasswordHash::new("rahasia123").salt, stored.salt);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Admin@Resto.ID ").unwrap(), "admin@resto.id");
        assert!(matches!(normalize_email("admin"), Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_and_login_admin() {
        let pool = test_pool().await;
        let request = RegisterAdmin {
            name: None,
            email: "owner@resto.id".to_string(),
            password: "secret99".to_string(),
            confirm_password: "secret99".to_string(),
        };
        let user = AuthService::register_admin(&pool, &request).await.unwrap();
        assert_eq!(user.name, "Admin");
        assert!(matches!(
            AuthService::register_admin(&pool, &request).await,
            Err(AuthError::EmailTaken(_))
        ));

        let login = AuthService::login_admin(
            &pool,
            &LoginRequest {
                email: "OWNER@resto.id".to_string(),
                password: "secret99".to_string(),
            },
        )
        .await
        .unwrap();
        let (session, resolved) = AuthService::authenticate(&pool, login.token, UserRole::Admin)
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(resolved.email, "owner@resto.id");

        AuthService::logout(&pool, login.token).await.unwrap();
        assert!(matches!(
            AuthService::authenticate(&pool, login.token, UserRole::Admin).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_mismatched_passwords() {
        let pool = test_pool().await;
        let err = AuthService::register_admin(
            &pool,
            &RegisterAdmin {
                name: Some("Owner".to_string()),
                email: "owner@resto.id".to_string(),
                password: "secret99".to_string(),
                confirm_password: "secret98".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_wrong_role_and_password() {
        let pool = test_pool().await;
        seed_admin(&pool, "boss@resto.id", "secret99").await;

        let wrong_role =
            AuthService::verify_credentials(&pool, "boss@resto.id", "secret99", UserRole::Kasir)
                .await;
        assert!(matches!(wrong_role, Err(AuthError::UnknownEmail)));

        let wrong_password =
            AuthService::verify_credentials(&pool, "boss@resto.id", "secret00", UserRole::Admin)
                .await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_session_role_is_enforced() {
        let pool = test_pool().await;
        let admin = seed_admin(&pool, "boss@resto.id", "secret99").await;
        let session = Session::create(&pool, admin.id, UserRole::Admin, None)
            .await
            .unwrap();
        assert!(matches!(
            AuthService::authenticate(&pool, session.token, UserRole::Kasir).await,
            Err(AuthError::Forbidden(UserRole::Kasir))
        ));
    }
}
