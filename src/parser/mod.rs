//! Parsing argument lists against a grammar
//!
//! [`Spec::parse`](crate::grammar::Spec::parse) drives a [`Tokenizer`] over
//! the raw arguments and returns a [`ParseResult`] or a [`UsageError`].

pub mod error;
pub mod parse;
pub mod result;
pub mod token;

pub use error::{UsageError, UsageErrorKind, UsageResult};
pub use result::{Binding, Bound, ElementKey, ParseResult, Subset};
pub use token::{Token, Tokenizer};
