//! Authorization policy for expenses and users.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::UserRole;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Caller's user ID.
    pub user_id: i32,
    /// Caller's current role.
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: i32, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns true if the actor is the given user.
    #[must_use]
    pub const fn is(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// Actions guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read a single expense.
    ReadExpense,
    /// Update or delete an expense.
    ModifyExpense,
    /// List every expense in the system.
    ListAllExpenses,
    /// List expenses for review and approve or reject them.
    ReviewExpenses,
    /// Create, list, delete users and change roles.
    ManageUsers,
    /// Read a user profile.
    ViewUser,
    /// Update a user profile.
    ModifyUser,
}

impl Capability {
    /// Human-readable reason used when access is denied.
    #[must_use]
    pub const fn denial_message(&self) -> &'static str {
        match self {
            Self::ReadExpense => "You cannot view this expense.",
            Self::ModifyExpense => "Access denied. You can only modify your own expenses.",
            Self::ListAllExpenses => "Access denied. Admin privileges required.",
            Self::ReviewExpenses => "Access denied. Manager or Admin privileges required.",
            Self::ManageUsers => "Access denied. Admin privileges required.",
            Self::ViewUser | Self::ModifyUser => {
                "Access denied. You can only access your own account."
            }
        }
    }
}

/// The target of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// System-wide action with no specific target.
    Any,
    /// An expense, identified by its owner.
    Expense {
        /// Owning user.
        owner_id: i32,
    },
    /// A user account.
    User {
        /// Target user.
        id: i32,
    },
}

/// Access denied by the policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AccessError {
    /// The capability that was refused.
    pub capability: Capability,
    /// Reason shown to the caller.
    pub message: &'static str,
}

/// Stateless authorization rules.
pub struct Policy;

impl Policy {
    /// Returns true if `actor` holds `capability` on `resource`.
    #[must_use]
    pub fn allows(actor: &Actor, capability: Capability, resource: Resource) -> bool {
        let admin = actor.role.is_admin();
        match capability {
            Capability::ReadExpense => true,
            Capability::ModifyExpense => match resource {
                Resource::Expense { owner_id } => admin || actor.is(owner_id),
                _ => admin,
            },
            Capability::ListAllExpenses | Capability::ManageUsers => admin,
            Capability::ReviewExpenses => actor.role.can_review(),
            Capability::ViewUser | Capability::ModifyUser => match resource {
                Resource::User { id } => admin || actor.is(id),
                _ => admin,
            },
        }
    }
}

/// Checks a capability, returning an error describing the denial.
///
/// # Errors
///
/// Returns `AccessError` if the policy refuses the action.
pub fn authorize(
    actor: &Actor,
    capability: Capability,
    resource: Resource,
) -> Result<(), AccessError> {
    if Policy::allows(actor, capability, resource) {
        Ok(())
    } else {
        Err(AccessError {
            capability,
            message: capability.denial_message(),
        })
    }
}
