//! JavaScript Bridge CLI Library
//!
//! Provides the Runtime struct and supporting modules for the `jsbridge`
//! command-line tool.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod error;
pub mod repl;
pub mod runtime;
pub mod stdlib;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
