//! AWS-oriented adapters and handlers for the lambhack function.
//!
//! This crate owns runtime integration details (the Lambda handler, API
//! Gateway proxy responses, environment configuration, process execution, and
//! tracing) and delegates request semantics to `lambhack_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
