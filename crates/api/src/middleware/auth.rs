//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use spendwise_core::access::Actor;
use spendwise_db::{UserRepository, entities::users};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Loads the user so the current role applies and deleted users are refused
/// 4. Stores an [`AuthUser`] in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let user = match UserRepository::new((*state.db).clone())
        .find_by_id(claims.user_id())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(user_id = claims.user_id(), "token for unknown user");
            return ApiError::unauthorized("invalid_token", "User no longer exists")
                .into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    request.extensions_mut().insert(AuthUser::from(user));
    next.run(request).await
}

/// Extractor for the authenticated caller.
///
/// Use this in handlers behind [`auth_middleware`]:
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let actor = auth.actor();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    actor: Actor,
    user: users::Model,
}

impl From<users::Model> for AuthUser {
    fn from(user: users::Model) -> Self {
        Self {
            actor: Actor::new(user.id, user.role.into()),
            user,
        }
    }
}

impl AuthUser {
    /// Returns the caller as seen by the access policy.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns the caller's user ID.
    #[must_use]
    pub const fn user_id(&self) -> i32 {
        self.actor.user_id
    }

    /// Returns the caller's user record.
    #[must_use]
    pub fn into_user(self) -> users::Model {
        self.user
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("unauthorized", "Authentication required"))
    }
}
