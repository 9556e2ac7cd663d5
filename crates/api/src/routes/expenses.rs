//! Expense lifecycle routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use spendwise_core::expense::ExpenseStatus;
use spendwise_db::ExpenseRepository;
use spendwise_db::entities::expenses;
use spendwise_db::repositories::{CreateExpenseInput, UpdateExpenseInput};

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ValidatedJson, ValidatedPath};
use crate::middleware::AuthUser;

/// Create expense request. Any `status` in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    /// Non-negative amount.
    pub amount: Decimal,
    /// Three-character currency code; defaults to USD.
    #[serde(default)]
    pub currency: Option<String>,
    /// Expense date; defaults to now.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Description.
    pub description: String,
}

/// Partial expense update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateExpenseRequest {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency code.
    pub currency: Option<String>,
    /// New date.
    pub date: Option<DateTime<Utc>>,
    /// New description.
    pub description: Option<String>,
    /// Requested status, `Approved` or `Rejected`. Reviewers only.
    pub status: Option<String>,
}

/// Expense as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: i32,
    /// Amount, as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Expense date.
    pub date: DateTime<Utc>,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: ExpenseStatus,
    /// Owning user.
    pub owner_id: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<expenses::Model> for ExpenseResponse {
    fn from(expense: expenses::Model) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount,
            currency: expense.currency,
            date: expense.date,
            description: expense.description,
            status: expense.status.into(),
            owner_id: expense.owner_id,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

pub(crate) fn to_responses(expenses: Vec<expenses::Model>) -> Vec<ExpenseResponse> {
    expenses.into_iter().map(ExpenseResponse::from).collect()
}

/// Creates the expense router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/expenses", post(create_expense))
        .route("/api/expenses/mine", get(list_my_expenses))
        .route("/api/expenses/all", get(list_all_expenses))
        .route(
            "/api/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

/// POST /api/expenses - Submit an expense. Always starts Pending.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .create(
            auth.actor(),
            CreateExpenseInput {
                amount: payload.amount,
                currency: payload.currency,
                date: payload.date,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(expense.into()))
}

/// GET /api/expenses/mine - The caller's own expenses.
async fn list_my_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = ExpenseRepository::new((*state.db).clone())
        .list_mine(auth.actor())
        .await?;

    Ok(Json(to_responses(expenses)))
}

/// GET /api/expenses/all - Every expense (Admin only).
async fn list_all_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = ExpenseRepository::new((*state.db).clone())
        .list_all(auth.actor())
        .await?;

    Ok(Json(to_responses(expenses)))
}

/// GET /api/expenses/{id} - One expense.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .get(auth.actor(), id)
        .await?;

    Ok(Json(expense.into()))
}

/// PUT /api/expenses/{id} - Partial update (owner or Admin).
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .update(
            auth.actor(),
            id,
            UpdateExpenseInput {
                amount: payload.amount,
                currency: payload.currency,
                date: payload.date,
                description: payload.description,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(expense.into()))
}

/// DELETE /api/expenses/{id} - Remove an expense (owner or Admin).
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedPath(id): ValidatedPath<i32>,
) -> Result<Json<Value>, ApiError> {
    ExpenseRepository::new((*state.db).clone())
        .delete(auth.actor(), id)
        .await?;

    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}
