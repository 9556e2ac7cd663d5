//! Approval routes for managers and admins.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use spendwise_db::ApprovalRepository;

use super::expenses::{ExpenseResponse, to_responses};
use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, ValidatedPath};
use crate::middleware::AuthUser;

/// Approve or reject request.
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    /// `Approved` or `Rejected`. Checked after the caller's role.
    #[serde(default)]
    pub status: String,
    /// Optional reviewer comments, echoed in the response message.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Decision result.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    /// Confirmation message.
    pub message: String,
    /// The expense after the decision.
    pub expense: ExpenseResponse,
}

/// Creates the approvals router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/approvals/pending", get(list_pending))
        .route("/api/approvals", get(list_for_approval))
        .route("/api/approvals/", get(list_for_approval))
        .route("/api/approvals/{id}", post(decide))
}

/// GET /api/approvals/pending - Expenses awaiting a decision.
async fn list_pending(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = ApprovalRepository::new((*state.db).clone())
        .list_pending(auth.actor())
        .await?;

    Ok(Json(to_responses(expenses)))
}

/// GET /api/approvals - Every expense, for review.
async fn list_for_approval(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = ApprovalRepository::new((*state.db).clone())
        .list_all(auth.actor())
        .await?;

    Ok(Json(to_responses(expenses)))
}

/// POST /api/approvals/{id} - Approve or reject a pending expense.
async fn decide(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let outcome = ApprovalRepository::new((*state.db).clone())
        .decide(auth.actor(), id, &payload.status, payload.comments.as_deref())
        .await?;

    Ok(Json(DecisionResponse {
        message: outcome.message,
        expense: outcome.expense.into(),
    }))
}
