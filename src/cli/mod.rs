//! CLI module for publishable
//!
//! Provides command-line interface for:
//! - check: Load and validate model declarations
//! - list: Records visible at an instant
//! - publish / expire: One-shot transitions on stored records
//! - explain: The resolved query for a model

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, expire, explain, list, publish, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
