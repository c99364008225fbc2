//! Host callables exposed to guest code.

use crate::{BridgeResult, Value};
use std::fmt;
use std::rc::Rc;

/// Access to the running engine from inside a host callable.
///
/// A host callable runs synchronously in the middle of a guest evaluation.
/// The scope lets it evaluate further guest source against the same
/// global environment without disturbing the outer call.
pub trait GuestScope {
    /// Evaluates `code` in the current global scope and returns its completion value.
    fn evaluate(&mut self, code: &str) -> BridgeResult<Value>;

    /// Reads the global named `name`.
    fn global(&mut self, name: &str) -> BridgeResult<Value>;

    /// Calls the global function `name` with `args`.
    ///
    /// Fails with [`crate::BridgeError::TypeError`] if the global is not
    /// callable.
    fn call_global(&mut self, name: &str, args: &[Value]) -> BridgeResult<Value>;
}

type Callable = dyn Fn(&mut dyn GuestScope, &[Value]) -> BridgeResult<Value>;

/// A host function that guest code can call.
///
/// Cloning is cheap: clones share the same closure.
///
/// The closure is stored inside the engine's heap, which does not trace
/// it. It must not capture garbage-collected engine values such as raw
/// engine objects; bridge handles (for example a live guest object
/// handle) are fine to capture because they only name a slot owned by
/// their context.
///
/// # Examples
///
/// ```
/// use core_types::{HostFunction, Value};
///
/// let add = HostFunction::from_fn(|args| {
///     let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
///     Ok(Value::from(sum))
/// });
/// assert_eq!(add.clone(), add);
/// ```
#[derive(Clone)]
pub struct HostFunction {
    inner: Rc<Callable>,
}

impl HostFunction {
    /// Wraps a closure that receives the calling scope and the coerced arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn GuestScope, &[Value]) -> BridgeResult<Value> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Wraps a closure that only needs its arguments.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> BridgeResult<Value> + 'static,
    {
        Self::new(move |_scope, args| f(args))
    }

    /// Invokes the callable.
    pub fn call(&self, scope: &mut dyn GuestScope, args: &[Value]) -> BridgeResult<Value> {
        (self.inner)(scope, args)
    }

    fn address(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({:p})", self.address())
    }
}

/// Two host functions are equal when they share the same closure.
impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}
