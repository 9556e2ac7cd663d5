//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <detail>}`.
//! Server-side failures are logged here and reach the client as a generic
//! message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use spendwise_core::access::AccessError;
use spendwise_core::auth::PasswordError;
use spendwise_core::expense::ExpenseError;
use spendwise_db::repositories::UserError;
use spendwise_shared::{AppError, JwtError};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status, code and message.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 401 with the given code.
    #[must_use]
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 400 with the given code.
    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 500 after logging `detail`.
    #[must_use]
    pub fn internal(detail: &dyn std::fmt::Display) -> Self {
        error!(error = %detail, "request failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_MESSAGE,
        )
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_domain(status: u16, code: &'static str, err: &dyn std::fmt::Display) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            return Self::internal(err);
        }
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        if e.is_server_error() {
            return Self::internal(&e);
        }
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        Self::new(status, e.error_code(), e.public_message())
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", e.message)
    }
}

impl From<ExpenseError> for ApiError {
    fn from(e: ExpenseError) -> Self {
        Self::from_domain(e.status_code(), e.error_code(), &e)
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        Self::from_domain(e.status_code(), e.error_code(), &e)
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        Self::internal(&e)
    }
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => Self::unauthorized("token_expired", "Token has expired"),
            JwtError::DecodingError(_) => {
                Self::unauthorized("invalid_token", "Invalid or malformed token")
            }
            JwtError::EncodingError(_) => Self::internal(&e),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooShort => Self::bad_request("validation_error", e.to_string()),
            _ => Self::internal(&e),
        }
    }
}
