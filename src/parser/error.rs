//! Usage errors: an argument list that does not fit its grammar

use thiserror::Error;

use crate::grammar::Spec;
use crate::usage::render_usage;

/// What went wrong, with the exact user-facing message as `Display`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageErrorKind {
    #[error("Missing required argument \"{0}\".")]
    MissingRequiredArgument(String),

    #[error("Unexpected argument \"{0}\".")]
    UnexpectedArgument(String),

    #[error("Unexpected option \"{0}\".")]
    UnexpectedOption(String),

    #[error("{}", duplicate_message(.label, .conflicts_with))]
    DuplicateElement {
        label: String,
        conflicts_with: Option<String>,
    },

    #[error("{message}")]
    ValidationFailed { label: String, message: String },
}

fn duplicate_message(label: &str, conflicts_with: &Option<String>) -> String {
    match conflicts_with {
        Some(other) => format!("Argument \"{label}\" cannot be combined with \"{other}\"."),
        None => format!("Argument \"{label}\" cannot be repeated."),
    }
}

/// A parse failure together with the grammar it was checked against, so the
/// caller can print the matching usage synopsis.
#[derive(Error, Debug, Clone)]
#[error("{kind}")]
pub struct UsageError {
    kind: UsageErrorKind,
    spec: Spec,
}

impl UsageError {
    pub fn new(kind: UsageErrorKind, spec: Spec) -> Self {
        Self { kind, spec }
    }

    pub fn kind(&self) -> &UsageErrorKind {
        &self.kind
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Wrapped `usage:` synopsis of the failing grammar.
    pub fn usage(&self, command_name: &str, width: usize) -> String {
        render_usage(&self.spec, command_name, width)
    }
}

/// Result type for parsing.
pub type UsageResult<T> = Result<T, UsageError>;
