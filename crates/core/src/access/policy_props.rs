//! Property-based tests for the authorization policy.

use proptest::prelude::*;

use crate::access::{Actor, Capability, Policy, Resource};
use crate::auth::UserRole;

fn arb_role() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Employee),
        Just(UserRole::Manager),
        Just(UserRole::Admin),
    ]
}

fn arb_actor() -> impl Strategy<Value = Actor> {
    (1i32..1000, arb_role()).prop_map(|(id, role)| Actor::new(id, role))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Admins hold every capability on every expense.
    #[test]
    fn prop_admin_can_modify_any_expense(id in 1i32..1000, owner_id in 1i32..1000) {
        let admin = Actor::new(id, UserRole::Admin);
        let resource = Resource::Expense { owner_id };
        prop_assert!(Policy::allows(&admin, Capability::ModifyExpense, resource));
    }

    /// A non-admin may modify an expense exactly when they own it.
    #[test]
    fn prop_non_admin_modify_iff_owner(
        id in 1i32..1000,
        owner_id in 1i32..1000,
        role in prop_oneof![Just(UserRole::Employee), Just(UserRole::Manager)],
    ) {
        let actor = Actor::new(id, role);
        let allowed = Policy::allows(
            &actor,
            Capability::ModifyExpense,
            Resource::Expense { owner_id },
        );
        prop_assert_eq!(allowed, id == owner_id);
    }

    /// Review access depends only on role, never on identity.
    #[test]
    fn prop_review_depends_only_on_role(actor in arb_actor()) {
        let allowed = Policy::allows(&actor, Capability::ReviewExpenses, Resource::Any);
        prop_assert_eq!(allowed, actor.role != UserRole::Employee);
    }

    /// Anyone can read any expense.
    #[test]
    fn prop_read_always_allowed(actor in arb_actor(), owner_id in 1i32..1000) {
        let resource = Resource::Expense { owner_id };
        prop_assert!(Policy::allows(&actor, Capability::ReadExpense, resource));
    }
}
