//! Capability-based authorization.
//!
//! Every operation asks one question: does the [`Actor`] hold a
//! [`Capability`] on a [`Resource`]? The rules live in [`Policy::allows`]
//! and nowhere else.

mod policy;

#[cfg(test)]
mod policy_props;

pub use policy::{AccessError, Actor, Capability, Policy, Resource, authorize};
