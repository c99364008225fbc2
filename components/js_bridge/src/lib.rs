//! Host/guest bridge over an embedded JavaScript engine.
//!
//! A [`Context`] owns one engine instance. Host code evaluates source in
//! it, defines globals (plain values or host callables) and gets results
//! back as [`Value`]s. Objects that must stay live are reached through
//! [`GuestObject`] handles.
//!
//! # Value crossing
//!
//! Values are copied in both directions (structured copy). Host
//! [`core_types::HostFunction`]s become callable guest functions. Guest
//! functions, symbols, BigInts and cyclic structures cannot be copied and
//! raise [`BridgeError::Coercion`]; use [`Context::evaluate_object`] or
//! [`GuestObject::get_object`] to hold on to them instead.
//!
//! # Modules
//!
//! [`Context::with_resolver`] installs a global `require` backed by a
//! [`module_resolver::ModuleResolver`] and a frozen `process.env`.
//! Required files run inside a CommonJS wrapper; `host/...` requests can
//! be satisfied by registered host modules.
//!
//! # Examples
//!
//! ```
//! use core_types::{HostFunction, Value};
//! use js_bridge::{Bindings, Context};
//!
//! let mut ctx = Context::new().unwrap();
//! ctx.define_global(
//!     "twice",
//!     HostFunction::from_fn(|args| {
//!         let n = args.first().and_then(Value::as_f64).unwrap_or(0.0);
//!         Ok(Value::from(n * 2.0))
//!     }),
//! )
//! .unwrap();
//!
//! let result = ctx.evaluate("twice(binding.n)", Bindings::new().with("n", 21)).unwrap();
//! assert_eq!(result, Value::from(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod coercion;
pub mod config;
pub mod context;
mod engine;
pub mod env;
mod handles;
mod loader;
pub mod proxy;
mod scope;

pub use coercion::{MAX_COPY_DEPTH, MAX_COPY_LENGTH};
pub use config::BridgeConfig;
pub use context::{evaljs, Bindings, Context, Script};
pub use core_types::{BridgeError, BridgeResult, GuestScope, HostFunction, Value};
pub use env::EnvSnapshot;
pub use proxy::GuestObject;
