//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;
use crate::parser::UsageError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// Arguments rejected by the grammar of `command` (e.g. `argspec check serve`).
    #[error("{error}")]
    Usage { command: String, error: UsageError },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    pub fn usage(command: impl Into<String>, error: UsageError) -> Self {
        CliError::Usage {
            command: command.into(),
            error,
        }
    }

    /// The wrapped `usage:` block of the grammar that rejected the arguments.
    pub fn usage_text(&self, width: usize) -> Option<String> {
        match self {
            CliError::Usage { command, error } => Some(error.usage(command, width)),
            CliError::Infra(_) => None,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::CommandFileNotFound(_)
                    | ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Grammar { .. }
                    | ApplicationError::InvalidDefinition { .. }
                    | ApplicationError::DuplicateCommand(_)
                    | ApplicationError::InvalidCommandFile { .. } => crate::exitcode::DATAERR,
                },
            },
        }
    }
}
