//! Approval repository: the reviewer side of the expense lifecycle.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{info, warn};

use spendwise_core::access::{Actor, Capability, Resource, authorize};
use spendwise_core::expense::{ExpenseError, ExpenseWorkflow};

use super::expense::{db_err, find, transition};
use crate::entities::{expenses, sea_orm_active_enums::ExpenseStatus};

/// Result of a successful decision.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// Confirmation message, including any reviewer comments.
    pub message: String,
    /// The expense after the decision.
    pub expense: expenses::Model,
}

/// Approval repository for manager and admin review.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    db: DatabaseConnection,
}

impl ApprovalRepository {
    /// Creates a new approval repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists expenses awaiting a decision.
    pub async fn list_pending(&self, actor: &Actor) -> Result<Vec<expenses::Model>, ExpenseError> {
        authorize(actor, Capability::ReviewExpenses, Resource::Any)?;
        expenses::Entity::find()
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists every expense for review, whatever its status.
    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<expenses::Model>, ExpenseError> {
        authorize(actor, Capability::ReviewExpenses, Resource::Any)?;
        expenses::Entity::find()
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Approves or rejects a pending expense.
    ///
    /// Checks run in a fixed order: role, decision value, existence, then
    /// current status. The last two are answered by the guarded update, which
    /// is the first statement of the transaction. Comments are echoed in the
    /// message and not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Caller is not a Manager or Admin
    /// - `decision` is not `Approved` or `Rejected`
    /// - Expense is not found
    /// - Expense is no longer Pending, including losing a concurrent decision
    /// - Database operation fails
    pub async fn decide(
        &self,
        actor: &Actor,
        expense_id: i32,
        decision: &str,
        comments: Option<&str>,
    ) -> Result<DecisionOutcome, ExpenseError> {
        if let Err(e) = authorize(actor, Capability::ReviewExpenses, Resource::Any) {
            warn!(user_id = actor.user_id, expense_id, "decision refused: not a reviewer");
            return Err(e.into());
        }
        let decision = ExpenseWorkflow::parse_decision(decision)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let target = transition(&txn, expense_id, decision).await?;

        let expense = find(&txn, expense_id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            expense_id,
            reviewer_id = actor.user_id,
            status = %target,
            "expense decided"
        );

        Ok(DecisionOutcome {
            message: ExpenseWorkflow::decision_message(decision, comments),
            expense,
        })
    }
}
