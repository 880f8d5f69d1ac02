//! Application layer: user-defined commands and named validators
//!
//! Turns declarative command files into grammars; depends on the I/O
//! boundary traits only.

pub mod definition;
pub mod error;
pub mod error_ext;
pub mod validators;

pub use definition::{Command, CommandSet};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
