//! CLI module
//!
//! Command-line interface for running extraction jobs.
//!
//! # Commands
//!
//! - `run` - Run jobs and write output files
//! - `jobs` - List configured jobs
//! - `check` - Validate configuration and test access

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandStatus, Runner};
