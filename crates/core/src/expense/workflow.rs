//! Expense workflow rules.
//!
//! Pure functions for status transitions and input validation. Persistence
//! lives in the db crate, which calls into these before writing.

use rust_decimal::Decimal;

use crate::expense::error::ExpenseError;
use crate::expense::types::{ApprovalDecision, ExpenseStatus};

/// Required currency code length.
pub const CURRENCY_CODE_LEN: usize = 3;

/// Expense workflow service.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    /// Checks if a status transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (
                ExpenseStatus::Pending,
                ExpenseStatus::Approved | ExpenseStatus::Rejected
            )
        )
    }

    /// Parses a requested decision.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDecision` for anything other than `Approved` or `Rejected`.
    pub fn parse_decision(raw: &str) -> Result<ApprovalDecision, ExpenseError> {
        ApprovalDecision::parse(raw).ok_or_else(|| ExpenseError::InvalidDecision(raw.to_string()))
    }

    /// Applies a decision to an expense in `current` status.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDecided` if the expense is not Pending.
    pub fn decide(
        current: ExpenseStatus,
        decision: ApprovalDecision,
    ) -> Result<ExpenseStatus, ExpenseError> {
        match current {
            ExpenseStatus::Pending => Ok(decision.target_status()),
            status => Err(ExpenseError::AlreadyDecided { status }),
        }
    }

    /// Builds the confirmation message for a decision.
    #[must_use]
    pub fn decision_message(decision: ApprovalDecision, comments: Option<&str>) -> String {
        let base = format!("Expense {} successfully", decision.verb());
        match comments {
            Some(c) if !c.is_empty() => format!("{base} with comments: {c}"),
            _ => base,
        }
    }

    /// Validates an expense amount.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount` if the amount is below zero.
    pub fn validate_amount(amount: Decimal) -> Result<(), ExpenseError> {
        if amount < Decimal::ZERO {
            return Err(ExpenseError::NegativeAmount);
        }
        Ok(())
    }

    /// Validates a currency code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCurrency` unless the code is exactly three characters.
    pub fn validate_currency(currency: &str) -> Result<(), ExpenseError> {
        if currency.chars().count() != CURRENCY_CODE_LEN {
            return Err(ExpenseError::InvalidCurrency(currency.to_string()));
        }
        Ok(())
    }
}
