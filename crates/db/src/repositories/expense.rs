//! Expense repository for the expense lifecycle.
//!
//! Every mutation runs in its own transaction, and every transaction that
//! reads before writing opens with a write. Status changes go through
//! [`transition`], a conditional update that only matches Pending rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use spendwise_core::access::{Actor, Capability, Resource, authorize};
use spendwise_core::expense::{
    ApprovalDecision, ExpenseError, ExpenseStatus as CoreStatus, ExpenseWorkflow,
};

use crate::entities::{expenses, sea_orm_active_enums::ExpenseStatus};

/// Currency used when a create request omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Non-negative amount.
    pub amount: Decimal,
    /// Three-character code; defaults to USD.
    pub currency: Option<String>,
    /// Expense date; defaults to now.
    pub date: Option<DateTime<Utc>>,
    /// Free-form description.
    pub description: String,
}

/// Partial update for an expense. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency code.
    pub currency: Option<String>,
    /// New date.
    pub date: Option<DateTime<Utc>>,
    /// New description.
    pub description: Option<String>,
    /// Requested status; must be `Approved` or `Rejected`.
    pub status: Option<String>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense owned by `actor`. Status is always Pending.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Amount is negative
    /// - Currency is not three characters
    /// - Database operation fails
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let currency = input
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        ExpenseWorkflow::validate_amount(input.amount)?;
        ExpenseWorkflow::validate_currency(&currency)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let now = Utc::now();
        let expense = expenses::ActiveModel {
            amount: Set(input.amount),
            currency: Set(currency),
            date: Set(input.date.unwrap_or(now)),
            description: Set(input.description),
            status: Set(ExpenseStatus::Pending),
            owner_id: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            expense_id = expense.id,
            owner_id = actor.user_id,
            amount = %expense.amount,
            "expense created"
        );
        Ok(expense)
    }

    /// Gets an expense by id. Any authenticated caller may read.
    pub async fn get(&self, actor: &Actor, id: i32) -> Result<expenses::Model, ExpenseError> {
        let expense = find(&self.db, id).await?;
        authorize(
            actor,
            Capability::ReadExpense,
            Resource::Expense {
                owner_id: expense.owner_id,
            },
        )?;
        Ok(expense)
    }

    /// Lists the caller's own expenses.
    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<expenses::Model>, ExpenseError> {
        expenses::Entity::find()
            .filter(expenses::Column::OwnerId.eq(actor.user_id))
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists every expense. Admin only.
    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<expenses::Model>, ExpenseError> {
        authorize(actor, Capability::ListAllExpenses, Resource::Any)?;
        expenses::Entity::find()
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Applies a partial update. Owner or admin.
    ///
    /// A `status` in the input is handled like an approval decision: the
    /// caller must also be able to review, and the expense must be Pending.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Expense is not found
    /// - Caller is neither owner nor admin, or lacks review rights for a status change
    /// - Status is not `Approved`/`Rejected`, or the expense is no longer Pending
    /// - Amount or currency is invalid
    /// - Database operation fails
    pub async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: UpdateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        claim(&txn, id).await?;
        let existing = find(&txn, id).await?;
        authorize(
            actor,
            Capability::ModifyExpense,
            Resource::Expense {
                owner_id: existing.owner_id,
            },
        )?;

        let decision = match input.status.as_deref() {
            Some(raw) => {
                authorize(actor, Capability::ReviewExpenses, Resource::Any)?;
                Some(ExpenseWorkflow::parse_decision(raw)?)
            }
            None => None,
        };
        if let Some(amount) = input.amount {
            ExpenseWorkflow::validate_amount(amount)?;
        }
        if let Some(currency) = input.currency.as_deref() {
            ExpenseWorkflow::validate_currency(currency)?;
        }

        if let Some(decision) = decision {
            ExpenseWorkflow::decide(existing.status.into(), decision)?;
            transition(&txn, id, decision).await?;
        }

        let mut active: expenses::ActiveModel = existing.into();
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        active.updated_at = Set(Utc::now());
        active.update(&txn).await.map_err(db_err)?;

        let updated = find(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(expense_id = id, updated_by = actor.user_id, "expense updated");
        Ok(updated)
    }

    /// Deletes an expense. Owner or admin.
    pub async fn delete(&self, actor: &Actor, id: i32) -> Result<(), ExpenseError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        claim(&txn, id).await?;
        let existing = find(&txn, id).await?;
        authorize(
            actor,
            Capability::ModifyExpense,
            Resource::Expense {
                owner_id: existing.owner_id,
            },
        )?;

        expenses::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!(expense_id = id, deleted_by = actor.user_id, "expense deleted");
        Ok(())
    }
}

/// Loads an expense or fails with `NotFound`.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<expenses::Model, ExpenseError> {
    expenses::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(ExpenseError::NotFound(id))
}

/// Takes the write lock on an expense row by touching `updated_at`.
///
/// Must be the first statement of a transaction that reads before it
/// writes: SQLite will not promote a reading transaction to a writer while
/// another writer holds the lock, and fails with `SQLITE_BUSY` instead of
/// waiting.
pub(crate) async fn claim<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), ExpenseError> {
    let result = expenses::Entity::update_many()
        .col_expr(expenses::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(expenses::Column::Id.eq(id))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        return Err(ExpenseError::NotFound(id));
    }
    Ok(())
}

/// Applies `decision` to a Pending expense and returns the new status.
///
/// The `WHERE status = 'Pending'` clause is the single point of
/// serialization for concurrent decisions. When it matches nothing the row
/// is re-read: a missing row is `NotFound`, a decided one `AlreadyDecided`
/// with the status the winner wrote.
pub(crate) async fn transition<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    decision: ApprovalDecision,
) -> Result<CoreStatus, ExpenseError> {
    let target = decision.target_status();
    let result = expenses::Entity::update_many()
        .col_expr(
            expenses::Column::Status,
            Expr::value(ExpenseStatus::from(target)),
        )
        .col_expr(expenses::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(expenses::Column::Id.eq(id))
        .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        let current = find(conn, id).await?;
        ExpenseWorkflow::decide(current.status.into(), decision)?;
        return Err(ExpenseError::Database(format!(
            "expense {id} is Pending but the guarded update matched no rows"
        )));
    }

    info!(expense_id = id, status = %target, "expense status changed");
    Ok(target)
}

pub(crate) fn db_err(e: DbErr) -> ExpenseError {
    tracing::error!(error = %e, "expense query failed");
    ExpenseError::Database(e.to_string())
}
