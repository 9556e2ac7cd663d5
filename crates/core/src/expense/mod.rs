//! Expense lifecycle and approval rules.
//!
//! An expense starts Pending and moves once, to Approved or Rejected.

pub mod error;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod workflow_props;

pub use error::ExpenseError;
pub use types::{ApprovalDecision, ExpenseStatus};
pub use workflow::{CURRENCY_CODE_LEN, ExpenseWorkflow};
