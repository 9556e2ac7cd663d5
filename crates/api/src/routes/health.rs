//! Informational endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use serde_json::{Value, json};

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Service banner.
async fn root() -> Json<Value> {
    Json(json!({
        "message": "SpendWise Expense Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "expenses": "/api/expenses",
            "approvals": "/api/approvals"
        }
    }))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Endpoint directory.
async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "SpendWise Expense Management API",
        "endpoints": {
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "me": "GET /api/auth/me"
            },
            "users": {
                "base_url": "/api/users",
                "description": "User management (Admin only, except own profile)"
            },
            "expenses": {
                "create": "POST /api/expenses",
                "my_expenses": "GET /api/expenses/mine",
                "all_expenses": "GET /api/expenses/all (Admin only)",
                "get": "GET /api/expenses/{id}",
                "update": "PUT /api/expenses/{id}",
                "delete": "DELETE /api/expenses/{id}"
            },
            "approvals": {
                "pending": "GET /api/approvals/pending (Manager/Admin)",
                "all": "GET /api/approvals (Manager/Admin)",
                "decide": "POST /api/approvals/{id} (Manager/Admin)"
            }
        }
    }))
}

/// Creates informational routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api", get(api_info))
}
