//! # Attack Simulations
//!
//! Each test plays an attacker against a fully wired router and asserts the
//! attack is rejected with no state change.

pub mod facet_substitution;
pub mod proof_forgery;
