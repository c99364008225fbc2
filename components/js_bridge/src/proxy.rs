//! Host-side handles over live guest objects.

use crate::coercion::Coercion;
use crate::engine::{error_message, with_weak_engine, EngineCell};
use crate::handles::{Handle, HandleTable};
use boa_engine::{js_string, Context as Engine, JsError, JsObject, JsString, JsValue};
use core_types::{BridgeError, BridgeResult, Value};
use std::fmt;
use std::rc::{Rc, Weak};

/// Text shown when a guest object cannot describe itself
const FALLBACK_DISPLAY: &str = "[object GuestObject]";

const TYPE_ERROR_PREFIX: &str = "TypeError: ";

/// A live reference to a guest object or function.
///
/// Unlike [`Value`], a `GuestObject` is not a copy: every access is a
/// round trip into the engine, so guest-side mutations are visible and
/// functions can be called.
///
/// The handle only weakly references its [`crate::Context`]. Once the
/// context is closed every operation fails with
/// [`BridgeError::ContextDestroyed`]; using a handle from inside a host
/// callable, while the engine is evaluating, fails with
/// [`BridgeError::ContextBusy`]. Host callables reach guest functions
/// through [`core_types::GuestScope::call_global`] instead.
///
/// The object itself stays in the context's handle table, so a
/// `GuestObject` may be captured by a [`core_types::HostFunction`].
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use js_bridge::Context;
///
/// let ctx = Context::new().unwrap();
/// let counter = ctx
///     .evaluate_object("({n: 0, bump(by) { this.n += by; return this.n; }})")
///     .unwrap();
///
/// assert_eq!(counter.call_method("bump", &[Value::from(2)]).unwrap(), Value::from(2));
/// assert_eq!(counter.get("n").unwrap(), Value::from(2));
/// ```
#[derive(Clone)]
pub struct GuestObject {
    handle: Rc<Handle>,
    engine: Weak<EngineCell>,
    coercion: Coercion,
}

impl GuestObject {
    pub(crate) fn new(
        object: JsObject,
        handles: &Rc<HandleTable>,
        engine: Weak<EngineCell>,
        coercion: Coercion,
    ) -> Self {
        Self {
            handle: Rc::new(handles.insert(object)),
            engine,
            coercion,
        }
    }

    /// Returns true if the object can be called. False once the context
    /// is gone.
    pub fn is_callable(&self) -> bool {
        self.handle
            .object()
            .is_some_and(|object| object.is_callable())
    }

    /// Returns true if the object is an array.
    pub fn is_array(&self) -> bool {
        self.handle.object().is_some_and(|object| object.is_array())
    }

    /// Calls the object as a function with `this` undefined.
    ///
    /// # Errors
    ///
    /// A guest `TypeError` yields [`BridgeError::TypeError`] with the
    /// message after the `"TypeError: "` prefix; any other throw yields
    /// [`BridgeError::Invocation`].
    pub fn call(&self, args: &[Value]) -> BridgeResult<Value> {
        self.with_object(|object, engine, coercion| {
            let this = JsValue::undefined();
            invoke(&object, &this, args, coercion, engine)
        })
    }

    /// Calls the method `name` with the object as `this`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> BridgeResult<Value> {
        self.with_object(|object, engine, coercion| {
            let method = object
                .get(JsString::from(name), engine)
                .map_err(|e| call_failure(&e, engine))?;
            let Some(method) = method.as_callable() else {
                return Err(BridgeError::TypeError(format!("{} is not a function", name)));
            };
            let this = JsValue::from(object.clone());
            invoke(method, &this, args, coercion, engine)
        })
    }

    /// Reads the property `key` and copies its value.
    pub fn get(&self, key: impl fmt::Display) -> BridgeResult<Value> {
        let key = JsString::from(key.to_string().as_str());
        self.with_object(|object, engine, coercion| {
            let value = object
                .get(key, engine)
                .map_err(|e| call_failure(&e, engine))?;
            coercion.from_guest(&value, engine)
        })
    }

    /// Reads the property `key` as another live handle.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Coercion`] if the property is not an object.
    pub fn get_object(&self, key: impl fmt::Display) -> BridgeResult<GuestObject> {
        let key = key.to_string();
        let nested = self.with_object(|object, engine, _| {
            let value = object
                .get(JsString::from(key.as_str()), engine)
                .map_err(|e| call_failure(&e, engine))?;
            value
                .as_object()
                .cloned()
                .ok_or_else(|| BridgeError::coercion(format!("property '{}' is not an object", key)))
        })?;
        let handles = self.handle.table().ok_or(BridgeError::ContextDestroyed)?;
        Ok(GuestObject::new(
            nested,
            &handles,
            self.engine.clone(),
            self.coercion.clone(),
        ))
    }

    /// Writes the property `key`.
    pub fn set(&self, key: impl fmt::Display, value: impl Into<Value>) -> BridgeResult<()> {
        let key = key.to_string();
        let value = value.into();
        self.with_object(|object, engine, coercion| {
            let converted = coercion
                .to_guest_named(&value, &key, engine)
                .map_err(|e| coercion.uncaught(&e, engine))?;
            object
                .set(JsString::from(key.as_str()), converted, true, engine)
                .map_err(|e| call_failure(&e, engine))?;
            Ok(())
        })
    }

    /// The object's `length` property.
    pub fn length(&self) -> BridgeResult<Value> {
        self.get("length")
    }

    /// Copies the whole object, as [`crate::Context::evaluate`] would.
    pub fn to_value(&self) -> BridgeResult<Value> {
        self.with_object(|object, engine, coercion| {
            coercion.from_guest(&JsValue::from(object), engine)
        })
    }

    fn with_object<T>(
        &self,
        f: impl FnOnce(JsObject, &mut Engine, &Coercion) -> BridgeResult<T>,
    ) -> BridgeResult<T> {
        with_weak_engine(&self.engine, |engine| {
            let object = self.handle.object().ok_or(BridgeError::ContextDestroyed)?;
            f(object, engine, &self.coercion)
        })
    }

    fn describe(&self) -> BridgeResult<String> {
        self.with_object(|object, engine, _| {
            let to_string = object
                .get(js_string!("toString"), engine)
                .map_err(|e| call_failure(&e, engine))?;
            let Some(to_string) = to_string.as_callable() else {
                return Err(BridgeError::TypeError("toString is not a function".to_string()));
            };
            let text = to_string
                .call(&JsValue::from(object.clone()), &[], engine)
                .and_then(|text| text.to_string(engine))
                .map_err(|e| call_failure(&e, engine))?;
            Ok(text.to_std_string_escaped())
        })
    }
}

/// Renders the object through its own `toString`.
impl fmt::Display for GuestObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str(FALLBACK_DISPLAY),
        }
    }
}

impl fmt::Debug for GuestObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestObject")
            .field("callable", &self.is_callable())
            .field("alive", &self.handle.object().is_some())
            .finish()
    }
}

fn invoke(
    function: &JsObject,
    this: &JsValue,
    args: &[Value],
    coercion: &Coercion,
    engine: &mut Engine,
) -> BridgeResult<Value> {
    let args = args
        .iter()
        .map(|arg| coercion.to_guest(arg, engine))
        .collect::<Result<Vec<_>, JsError>>()
        .map_err(|e| coercion.uncaught(&e, engine))?;
    let result = function
        .call(this, &args, engine)
        .map_err(|e| call_failure(&e, engine))?;
    coercion.from_guest(&result, engine)
}

/// Classifies an exception raised during a proxy operation.
fn call_failure(error: &JsError, engine: &mut Engine) -> BridgeError {
    let message = error_message(error, engine);
    match message.strip_prefix(TYPE_ERROR_PREFIX) {
        Some(rest) => BridgeError::TypeError(rest.to_string()),
        None => BridgeError::Invocation { message },
    }
}
