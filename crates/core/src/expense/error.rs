//! Expense error types.

use thiserror::Error;

use spendwise_shared::AppError;

use crate::access::AccessError;
use crate::expense::types::ExpenseStatus;

/// Errors that can occur during expense and approval operations.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Caller lacks the capability for this operation.
    #[error(transparent)]
    AccessDenied(#[from] AccessError),

    /// Expense does not exist.
    #[error("Expense not found")]
    NotFound(i32),

    /// Decision was not `Approved` or `Rejected`.
    #[error("Status must be either 'Approved' or 'Rejected'")]
    InvalidDecision(String),

    /// Expense has already left Pending.
    #[error("Expense is already {status}. Cannot change status.")]
    AlreadyDecided {
        /// The current terminal status.
        status: ExpenseStatus,
    },

    /// Amount below zero.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Currency is not a 3-character code.
    #[error("Currency must be a 3-character code, got '{0}'")]
    InvalidCurrency(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ExpenseError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AccessDenied(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidDecision(_)
            | Self::AlreadyDecided { .. }
            | Self::NegativeAmount
            | Self::InvalidCurrency(_) => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::InvalidDecision(_) => "invalid_status",
            Self::AlreadyDecided { .. } => "already_decided",
            Self::NegativeAmount => "negative_amount",
            Self::InvalidCurrency(_) => "invalid_currency",
            Self::Database(_) => "internal_error",
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(e: ExpenseError) -> Self {
        let message = e.to_string();
        match e {
            ExpenseError::AccessDenied(_) => Self::Forbidden(message),
            ExpenseError::NotFound(_) => Self::NotFound(message),
            ExpenseError::InvalidDecision(_) | ExpenseError::AlreadyDecided { .. } => {
                Self::BadRequest(message)
            }
            ExpenseError::NegativeAmount | ExpenseError::InvalidCurrency(_) => {
                Self::Validation(message)
            }
            ExpenseError::Database(detail) => Self::Database(detail),
        }
    }
}
