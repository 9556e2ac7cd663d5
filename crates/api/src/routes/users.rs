//! User management routes.
//!
//! Admins manage every account; other users may only read and edit their own.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use spendwise_core::access::{Capability, Resource, authorize};
use spendwise_core::auth::{UserRole, check_policy, hash_password};
use spendwise_db::UserRepository;
use spendwise_db::entities::users;
use spendwise_db::repositories::{NewUser, UserChanges};
use spendwise_shared::auth::{ChangeRoleRequest, CreateUserRequest, UpdateUserRequest};
use spendwise_shared::types::{PageRequest, PageResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, ValidatedPath};
use crate::middleware::AuthUser;

/// Public view of a user. The password hash is never included.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Current role.
    pub role: UserRole,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.into(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Creates the user management router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/users/{id}/role", put(change_role))
}

/// Parses a role name, rejecting unknown values.
pub(crate) fn parse_role(raw: &str) -> Result<UserRole, ApiError> {
    UserRole::parse(raw).ok_or_else(|| {
        ApiError::bad_request(
            "invalid_role",
            format!("Invalid role '{raw}'. Must be one of: Employee, Manager, Admin"),
        )
    })
}

/// Applies the password policy and hashes.
pub(crate) fn hash_new_password(password: &str) -> Result<String, ApiError> {
    check_policy(password)?;
    Ok(hash_password(password)?)
}

/// POST /api/users - Create a user with an explicit role (Admin only).
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Refuse before hashing.
    authorize(auth.actor(), Capability::ManageUsers, Resource::Any)?;

    let role = payload
        .role
        .as_deref()
        .map(parse_role)
        .transpose()?
        .unwrap_or_default();
    let password_hash = hash_new_password(&payload.password)?;

    let user = UserRepository::new((*state.db).clone())
        .create(
            auth.actor(),
            NewUser {
                name: payload.name,
                email: payload.email,
                password_hash,
                role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users?skip&limit - List users (Admin only).
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    let page = UserRepository::new((*state.db).clone())
        .list(auth.actor(), page)
        .await?;

    Ok(Json(page.map(UserResponse::from)))
}

/// GET /api/users/{id} - Get a user (self or Admin).
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new((*state.db).clone())
        .get(auth.actor(), id)
        .await?;

    Ok(Json(user.into()))
}

/// PUT /api/users/{id} - Update name, email or password (self or Admin).
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let password_hash = payload
        .password
        .as_deref()
        .map(hash_new_password)
        .transpose()?;

    let user = UserRepository::new((*state.db).clone())
        .update(
            auth.actor(),
            id,
            UserChanges {
                name: payload.name,
                email: payload.email,
                password_hash,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// PUT /api/users/{id}/role - Change a user's role (Admin only).
async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<ChangeRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = parse_role(&payload.role)?;

    let user = UserRepository::new((*state.db).clone())
        .change_role(auth.actor(), id, role)
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /api/users/{id} - Delete a user and their expenses (Admin only).
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<Json<serde_json::Value>, ApiError> {
    UserRepository::new((*state.db).clone())
        .delete(auth.actor(), id)
        .await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
