//! Grammar construction errors (raised while building, never while parsing)

use thiserror::Error;

/// A grammar that cannot be built.
///
/// These are programming errors in a command's declaration and surface when
/// the `Spec` is constructed, not when a user runs the command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("option \"{label}\" needs a short or a long name")]
    MissingOptionName { label: String },

    #[error("invalid option name \"{0}\" (expected -x or --name)")]
    InvalidOptionName(String),

    #[error("element label must not be empty")]
    EmptyLabel,

    #[error("element id must not be empty (label \"{0}\")")]
    EmptyId(String),

    #[error("duplicate element id \"{0}\" in the same scope")]
    DuplicateId(String),

    #[error("option name \"{0}\" is declared twice in the same scope")]
    DuplicateOptionName(String),

    #[error("positional \"{0}\" cannot carry a parameter grammar")]
    ParametersOnPositional(String),

    #[error("exclusion group \"{group}\" mixes optional and required members")]
    InconsistentExclusionGroup { group: String },
}

/// Result type for grammar construction.
pub type GrammarResult<T> = Result<T, GrammarError>;
