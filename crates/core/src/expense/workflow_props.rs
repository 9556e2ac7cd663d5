//! Property-based tests for the expense workflow.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::expense::types::{ApprovalDecision, ExpenseStatus};
use crate::expense::workflow::ExpenseWorkflow;

fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
    ]
}

fn arb_decision() -> impl Strategy<Value = ApprovalDecision> {
    prop_oneof![Just(ApprovalDecision::Approve), Just(ApprovalDecision::Reject)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A decision succeeds exactly when the expense is Pending.
    #[test]
    fn prop_decide_only_from_pending(status in arb_status(), decision in arb_decision()) {
        let result = ExpenseWorkflow::decide(status, decision);
        prop_assert_eq!(result.is_ok(), status == ExpenseStatus::Pending);
    }

    /// Every successful decision lands in a terminal status.
    #[test]
    fn prop_decide_lands_terminal(decision in arb_decision()) {
        let next = ExpenseWorkflow::decide(ExpenseStatus::Pending, decision).unwrap();
        prop_assert!(next.is_terminal());
        prop_assert!(ExpenseWorkflow::is_valid_transition(ExpenseStatus::Pending, next));
    }

    /// Terminal statuses never transition anywhere.
    #[test]
    fn prop_terminal_is_final(from in arb_status(), to in arb_status()) {
        if from.is_terminal() {
            prop_assert!(!ExpenseWorkflow::is_valid_transition(from, to));
        }
    }

    /// Non-negative amounts pass, negative amounts fail.
    #[test]
    fn prop_amount_sign(cents in -1_000_000i64..1_000_000) {
        let amount = Decimal::new(cents, 2);
        prop_assert_eq!(ExpenseWorkflow::validate_amount(amount).is_ok(), cents >= 0);
    }

    /// Only decision strings outside the two accepted values are rejected.
    #[test]
    fn prop_parse_decision_rejects_other_strings(s in "[A-Za-z]{0,12}") {
        let ok = ExpenseWorkflow::parse_decision(&s).is_ok();
        prop_assert_eq!(ok, s == "Approved" || s == "Rejected");
    }
}
