//! CLI Module Organization
//!
//! - args: CLI argument structures
//! - commands: command execution and summary output

pub mod args;
pub mod commands;

pub use args::*;
pub use commands::*;
