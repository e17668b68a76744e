//! Runtime-free lambhack primitives.
//!
//! This crate owns the request/response contract, the command runner boundary,
//! and the handler logic. It intentionally excludes Lambda runtime, process
//! spawning, and logging backend concerns; those are injected by
//! `lambhack_lambda`.

pub mod contract;
pub mod handler;
pub mod runner;
