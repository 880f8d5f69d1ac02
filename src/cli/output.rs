//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically. Only the
//! diagnostics on stderr are coloured; command output stays plain.

use colored::Colorize;

use crate::cli::CliError;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print a rendered usage block to stderr with a bold `usage:` prefix
pub fn usage(block: &str) {
    match block.strip_prefix("usage:") {
        Some(rest) => eprintln!("{}{}", "usage:".bold(), rest),
        None => eprintln!("{}", block),
    }
}

/// Report a failed invocation: the message, then the usage block if the
/// arguments were rejected by a grammar.
pub fn report(err: &CliError, width: usize) {
    error(err);
    if let Some(block) = err.usage_text(width) {
        usage(&block);
    }
}
