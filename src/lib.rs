//! Declarative argument grammars
//!
//! A command describes its arguments as a [`Spec`]: an ordered list of
//! positionals and options, where an option may carry its own nested
//! grammar. [`Spec::parse`] turns an argument list into a queryable
//! [`ParseResult`] or a [`UsageError`], and [`Spec::usage`] renders the
//! wrapped `usage:` synopsis shown alongside every error.
//!
//! ```
//! use argspec::{option, positional, Spec};
//!
//! let spec = Spec::new(
//!     true,
//!     [
//!         option("-l", "--long").repeatable().parameter(positional("foo")),
//!         positional("arg"),
//!     ],
//! )
//! .unwrap();
//!
//! let result = spec.parse(["-l", "x", "-l", "y", "arg1"]).unwrap();
//! assert_eq!(result.get_values("--long"), ["x", "y"]);
//! assert_eq!(result.get_value("arg"), Some("arg1"));
//!
//! let err = spec.parse(["arg1", "extra"]).unwrap_err();
//! assert_eq!(err.to_string(), "Unexpected argument \"extra\".");
//! assert_eq!(err.usage("myapp", 80), "usage: myapp (-l|--long foo)... arg");
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod exitcode;
pub mod grammar;
pub mod infrastructure;
pub mod parser;
pub mod usage;
pub mod util;

pub use grammar::{
    long_option, option, positional, short_option, Element, ElementBuilder, ElementKind,
    GrammarError, GrammarResult, Spec, Validator,
};
pub use parser::{Binding, Bound, ElementKey, ParseResult, Subset, UsageError, UsageErrorKind, UsageResult};
pub use usage::render_usage;
