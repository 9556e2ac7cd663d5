//! Domain rules for SpendWise.
//!
//! This crate has no web or database dependencies. Roles, the access
//! policy and the expense state machine live here so the db and api
//! crates share a single definition of each rule.
//!
//! # Modules
//!
//! - `access` - Capability checks for actors on expenses and users
//! - `auth` - User roles and password hashing
//! - `expense` - Expense statuses, approval decisions and validation

pub mod access;
pub mod auth;
pub mod expense;
