//! CLI layer: built-in commands, dispatch and terminal output

pub mod commands;
pub mod error;
pub mod output;

pub use commands::{execute_command, run, run_invocation, Invocation};
pub use error::{CliError, CliResult};
