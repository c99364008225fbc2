//! Error types for the CLI

use core_types::{BridgeError, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Failure reported by the bridge (resolution, guest exception, ...)
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// A script file could not be read
    #[error("could not read '{}': {source}", path.display())]
    Io {
        /// The file being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Result could not be printed in the requested format
    #[error("cannot format result: {0}")]
    Output(String),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Guest-side failures exit with 1, resolution failures with 2 and
    /// everything the host environment caused with 3.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Bridge(error) => match error.kind() {
                ErrorKind::Resolution => 2,
                ErrorKind::Io | ErrorKind::Config | ErrorKind::Lifetime => 3,
                _ => 1,
            },
            CliError::Io { .. } | CliError::Repl(_) => 3,
            CliError::Output(_) => 1,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
