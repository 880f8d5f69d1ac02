//! Grammar model: the declarative description of a command's arguments
//!
//! Pure data; no parsing, no I/O.

pub mod element;
pub mod error;
pub mod spec;

pub use element::{
    long_option, option, positional, short_option, Element, ElementBuilder, ElementKind,
    Validator,
};
pub use error::{GrammarError, GrammarResult};
pub use spec::Spec;
