//! Application-level errors (wraps grammar errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::grammar::GrammarError;

/// Application errors: broken command definitions, settings, unreadable files.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("command \"{command}\": {source}")]
    Grammar {
        command: String,
        #[source]
        source: GrammarError,
    },

    #[error("command \"{command}\": {message}")]
    InvalidDefinition { command: String, message: String },

    #[error("command \"{0}\" is defined more than once")]
    DuplicateCommand(String),

    #[error("invalid command file {origin}: {message}")]
    InvalidCommandFile { origin: String, message: String },

    #[error("commands file not found: {0}")]
    CommandFileNotFound(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn grammar(command: impl Into<String>, source: GrammarError) -> Self {
        Self::Grammar {
            command: command.into(),
            source,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
