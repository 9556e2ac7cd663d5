//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Each mutating call takes the acting user and checks the access policy
//! before it writes.

pub mod approval;
pub mod expense;
pub mod user;

pub use approval::{ApprovalRepository, DecisionOutcome};
pub use expense::{CreateExpenseInput, DEFAULT_CURRENCY, ExpenseRepository, UpdateExpenseInput};
pub use user::{NewUser, UserChanges, UserError, UserRepository};
