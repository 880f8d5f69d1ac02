//! Infrastructure layer: I/O implementations and DI container

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
