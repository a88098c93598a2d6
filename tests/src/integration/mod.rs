//! # Integration Flows
//!
//! Drive the router only through its public API, the way an operator and a
//! deployment pipeline would.

pub mod emergency_flow;
pub mod governance_flow;
