//! CLI command implementations.

pub mod dump;
pub mod scenarios;
pub mod stress;
