//! Shared types for the SGE desktop shell
//!
//! Contains only the vocabulary used by more than one crate: dependency
//! identifiers, health status, the logging setup and the shared error type.

pub mod console;
pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use logging::Component;
pub use types::*;
