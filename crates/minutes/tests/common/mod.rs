//! Shared helpers for the integration tests.
//!
//! - Builders for metadata and config files
//! - Scripted gateways that answer every stage prompt

pub mod builders;
pub mod gateway;

pub use builders::*;
pub use gateway::*;
