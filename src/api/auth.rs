use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::{self, AdminUser, CurrentUser};
use crate::db::User;
use crate::error::ApiError;

const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=100;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !USERNAME_CHARS.contains(&self.username.trim().chars().count()) {
            return Err(ApiError::bad_request(
                "Username must be between 3 and 100 characters",
            ));
        }
        if !self.email.contains('@') {
            return Err(ApiError::bad_request("A valid email address is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ApiError::bad_request(
                "Password must be at least 6 characters",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: String,
    pub is_admin: bool,
}

fn token_response(state: &AppState, user: &User) -> Result<TokenResponse, ApiError> {
    Ok(TokenResponse {
        access_token: state.tokens.issue(user)?,
        token_type: "bearer",
        user_id: user.id.clone(),
        is_admin: user.is_admin,
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let db = state.db.clone();
    let user = off_runtime(move || {
        auth::register(&db, req.username.trim(), req.email.trim(), &req.password)
    })
    .await?;
    tracing::info!(user_id = %user.id, username = %user.username, admin = user.is_admin, "User registered");

    Ok((StatusCode::CREATED, Json(token_response(&state, &user)?)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let db = state.db.clone();
    let user = off_runtime(move || {
        auth::login(&db, &req.username, &req.password).inspect_err(|e| {
            tracing::warn!(username = %req.username, "Login refused: {e}");
        })
    })
    .await?;
    Ok(Json(token_response(&state, &user)?))
}

/// Run password hashing on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, auth::AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {e}");
            ApiError::internal("Internal server error")
        })?
        .map_err(ApiError::from)
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// GET /api/auth/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.db.list_users()?))
}
