//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_policy, hash_password, verify_password,
};

use serde::{Deserialize, Serialize};

/// Roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserRole {
    /// Submits and manages their own expenses.
    #[default]
    Employee,
    /// Reviews expenses submitted by others.
    Manager,
    /// Full access, including user management.
    Admin,
}

impl UserRole {
    /// All roles, lowest privilege first.
    pub const ALL: [Self; 3] = [Self::Employee, Self::Manager, Self::Admin];

    /// Returns the canonical name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::Admin => "Admin",
        }
    }

    /// Parses a role from its canonical name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if this role can approve or reject expenses.
    #[must_use]
    pub const fn can_review(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }

    /// Returns true if this role has administrative access.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
