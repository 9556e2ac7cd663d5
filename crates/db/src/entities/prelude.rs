//! Entity re-exports.

pub use super::expenses::Entity as Expenses;
pub use super::users::Entity as Users;
