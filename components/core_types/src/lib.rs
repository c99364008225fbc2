//! Core value types and error handling for the host/guest bridge.
//!
//! This crate provides the types shared by every layer of the bridge:
//! the host-side representation of guest values, host callables that
//! guest code can invoke, and the error taxonomy.
//!
//! # Overview
//!
//! - [`Value`] - Structured copy of a JavaScript value
//! - [`HostFunction`] - Host closure callable from guest code
//! - [`GuestScope`] - Re-entry point handed to host callables
//! - [`BridgeError`] - Every failure the bridge can report
//! - [`ErrorKind`] - Coarse classification of a [`BridgeError`]
//!
//! # Examples
//!
//! ```
//! use core_types::{BridgeError, ErrorKind, Value};
//!
//! let config = Value::object([("name", Value::from("demo")), ("retries", Value::from(3))]);
//! assert_eq!(config.get("retries"), Some(&Value::Number(3.0)));
//! assert_eq!(config.type_of(), "object");
//!
//! let error = BridgeError::ModuleNotFound { id: "lodash".to_string() };
//! assert_eq!(error.kind(), ErrorKind::Resolution);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod function;
mod value;

pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use function::{GuestScope, HostFunction};
pub use value::Value;
