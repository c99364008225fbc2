//! Bridge error types.
//!
//! Every failure crossing the host/guest boundary is reported as a
//! [`BridgeError`]. Variants map one-to-one onto the situations a caller
//! may want to handle separately (a missing module, a guest throw, a
//! value that cannot be copied, a dead context).

use std::path::PathBuf;
use thiserror::Error;

/// The kind of bridge error.
///
/// Groups [`BridgeError`] variants into the categories callers usually
/// branch on (for example to pick a process exit code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Module id could not be resolved or its descriptor is invalid
    Resolution,
    /// Uncaught exception inside guest code
    Runtime,
    /// Guest type mismatch surfaced through a proxy call
    Type,
    /// Generic failure while invoking a guest function
    Invocation,
    /// A host callable returned an error
    HostCallable,
    /// A value could not be represented on the other side
    Coercion,
    /// The owning context is gone or currently busy
    Lifetime,
    /// Filesystem failure
    Io,
    /// Invalid configuration
    Config,
}

/// A failure reported by the bridge.
///
/// # Examples
///
/// ```
/// use core_types::BridgeError;
///
/// let error = BridgeError::TypeError("foo is not a function".to_string());
/// assert_eq!(error.to_string(), "TypeError: foo is not a function");
/// ```
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Every candidate in every ring was exhausted for some segment of `id`
    #[error("Cannot find module '{id}'")]
    ModuleNotFound {
        /// The full module id that was requested
        id: String,
    },

    /// The module id is syntactically unusable
    #[error("invalid module id '{id}': {reason}")]
    InvalidModuleId {
        /// The offending id
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// A `package.json` could not be parsed
    #[error("invalid package descriptor {}: {message}", path.display())]
    PackageDescriptor {
        /// Path of the descriptor
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// A host module declares an export it does not define
    #[error("host module '{module}' declares missing export '{name}'")]
    MissingExport {
        /// Host module name
        module: String,
        /// Declared export name
        name: String,
    },

    /// Reading a module from disk failed
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Guest code threw and nothing caught it
    #[error("{message}")]
    GuestRuntime {
        /// The guest error's string form, e.g. `"Error: boom"`
        message: String,
    },

    /// A guest call failed with a `TypeError`; the prefix is stripped
    #[error("TypeError: {0}")]
    TypeError(String),

    /// A guest call failed with anything other than a `TypeError`
    #[error("{message}")]
    Invocation {
        /// Full string form of the thrown value
        message: String,
    },

    /// A host callable returned an error while guest code was calling it
    #[error("host function '{name}' failed: {message}")]
    HostCallable {
        /// Global or export name the callable was installed under
        name: String,
        /// Message of the host error
        message: String,
    },

    /// Free-form error raised by host code
    #[error("{0}")]
    Host(String),

    /// A value cannot be represented under structured copy
    #[error("cannot coerce value: {0}")]
    Coercion(String),

    /// The context owning a guest reference has been destroyed
    #[error("context has been destroyed")]
    ContextDestroyed,

    /// The context is in the middle of an evaluation and cannot be re-borrowed
    #[error("context is busy evaluating guest code")]
    ContextBusy,

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Creates a free-form host error.
    pub fn host(message: impl Into<String>) -> Self {
        BridgeError::Host(message.into())
    }

    /// Creates a coercion error.
    pub fn coercion(message: impl Into<String>) -> Self {
        BridgeError::Coercion(message.into())
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::ModuleNotFound { .. }
            | BridgeError::InvalidModuleId { .. }
            | BridgeError::PackageDescriptor { .. }
            | BridgeError::MissingExport { .. } => ErrorKind::Resolution,
            BridgeError::Io { .. } => ErrorKind::Io,
            BridgeError::GuestRuntime { .. } | BridgeError::Host(_) => ErrorKind::Runtime,
            BridgeError::TypeError(_) => ErrorKind::Type,
            BridgeError::Invocation { .. } => ErrorKind::Invocation,
            BridgeError::HostCallable { .. } => ErrorKind::HostCallable,
            BridgeError::Coercion(_) => ErrorKind::Coercion,
            BridgeError::ContextDestroyed | BridgeError::ContextBusy => ErrorKind::Lifetime,
            BridgeError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
