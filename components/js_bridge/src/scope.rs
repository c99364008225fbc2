//! Re-entry into the engine from inside a host callable.

use crate::coercion::Coercion;
use boa_engine::{Context as Engine, JsError, JsString, JsValue, Source};
use core_types::{BridgeError, BridgeResult, GuestScope, Value};
use log::trace;

/// The [`GuestScope`] handed to host callables.
///
/// Wraps the engine borrow that the running native function received, so
/// nested evaluation shares the caller's global environment.
pub(crate) struct CallScope<'a> {
    engine: &'a mut Engine,
    coercion: &'a Coercion,
}

impl<'a> CallScope<'a> {
    pub(crate) fn new(engine: &'a mut Engine, coercion: &'a Coercion) -> Self {
        Self { engine, coercion }
    }
}

impl GuestScope for CallScope<'_> {
    fn evaluate(&mut self, code: &str) -> BridgeResult<Value> {
        trace!("re-entrant evaluation of {} bytes", code.len());
        let value = self
            .engine
            .eval(Source::from_bytes(code))
            .map_err(|e| self.coercion.uncaught(&e, self.engine))?;
        self.coercion.from_guest(&value, self.engine)
    }

    fn global(&mut self, name: &str) -> BridgeResult<Value> {
        let global = self.engine.global_object();
        let value = global
            .get(JsString::from(name), self.engine)
            .map_err(|e| self.coercion.uncaught(&e, self.engine))?;
        self.coercion.from_guest(&value, self.engine)
    }

    fn call_global(&mut self, name: &str, args: &[Value]) -> BridgeResult<Value> {
        trace!("re-entrant call of '{}' with {} args", name, args.len());
        let global = self.engine.global_object();
        let function = global
            .get(JsString::from(name), self.engine)
            .map_err(|e| self.coercion.uncaught(&e, self.engine))?;
        let Some(function) = function.as_callable() else {
            return Err(BridgeError::TypeError(format!("{} is not a function", name)));
        };

        let args = args
            .iter()
            .map(|arg| self.coercion.to_guest(arg, self.engine))
            .collect::<Result<Vec<_>, JsError>>()
            .map_err(|e| self.coercion.uncaught(&e, self.engine))?;
        let result = function
            .call(&JsValue::undefined(), &args, self.engine)
            .map_err(|e| self.coercion.uncaught(&e, self.engine))?;
        self.coercion.from_guest(&result, self.engine)
    }
}
