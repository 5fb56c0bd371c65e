//! # surgecast-contracts
//!
//! Shared types, records, and contracts for the SURGECAST agent pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate. Only data definitions, small lookups, and error types.

pub mod agent;
pub mod config;
pub mod cycle;
pub mod environment;
pub mod error;
pub mod execution;
pub mod message;
