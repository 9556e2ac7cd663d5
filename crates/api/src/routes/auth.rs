//! Authentication routes for register, login, and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;

use spendwise_core::auth::{UserRole, verify_password};
use spendwise_db::UserRepository;
use spendwise_shared::TokenResponse;
use spendwise_shared::auth::{LoginRequest, RegisterRequest};

use super::users::{UserResponse, hash_new_password};
use crate::AppState;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Successful login: a bearer token plus the user it belongs to.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token fields.
    #[serde(flatten)]
    pub token: TokenResponse,
    /// Logged-in user.
    pub user: UserResponse,
}

/// Routes that do not require a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes behind the auth middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(me))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid_credentials", "Invalid email or password")
}

/// POST /api/auth/register - Self-service signup as an Employee.
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = hash_new_password(&payload.password)?;

    let user = UserRepository::new((*state.db).clone())
        .register(&payload.name, &payload.email, &password_hash)
        .await?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/login - Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(user) = UserRepository::new((*state.db).clone())
        .find_by_email(&payload.email)
        .await?
    else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    let role = UserRole::from(user.role);
    let access_token = state
        .jwt_service
        .generate_access_token(user.id, role.as_str())?;

    info!(user_id = user.id, "User logged in successfully");

    Ok(Json(LoginResponse {
        token: TokenResponse::bearer(access_token, state.jwt_service.access_token_expires_in()),
        user: user.into(),
    }))
}

/// GET /api/auth/me - The authenticated user.
async fn me(auth: AuthUser) -> Json<UserResponse> {
    Json(auth.into_user().into())
}
