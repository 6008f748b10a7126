//! CLI module
//!
//! Command-line interface for running the sync job.
//!
//! # Commands
//!
//! - `run` - Diff, convert and publish targets (default)
//! - `diff` - Show new files without converting
//! - `datasets` - List the configured datasets

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
