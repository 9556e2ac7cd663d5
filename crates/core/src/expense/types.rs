//! Expense domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Expense status in the approval lifecycle.
///
/// Valid transitions:
/// - Pending → Approved
/// - Pending → Rejected
///
/// Approved and Rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpenseStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Accepted by a reviewer.
    Approved,
    /// Declined by a reviewer.
    Rejected,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    /// Parses a status from its exact name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once a decision has been made.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's verdict on a pending expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalDecision {
    /// Move the expense to Approved.
    Approve,
    /// Move the expense to Rejected.
    Reject,
}

impl ApprovalDecision {
    /// Parses a decision from the exact strings `Approved` or `Rejected`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Approved" => Some(Self::Approve),
            "Rejected" => Some(Self::Reject),
            _ => None,
        }
    }

    /// The status the expense ends up in.
    #[must_use]
    pub const fn target_status(&self) -> ExpenseStatus {
        match self {
            Self::Approve => ExpenseStatus::Approved,
            Self::Reject => ExpenseStatus::Rejected,
        }
    }

    /// Past-tense verb used in confirmation messages.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}
