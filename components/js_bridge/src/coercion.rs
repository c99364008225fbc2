//! Value coercion between host [`Value`]s and engine values.
//!
//! Every crossing is a structured copy. Host callables become native guest
//! functions; guest functions, symbols, BigInts and cyclic structures
//! cannot be copied and raise [`BridgeError::Coercion`]. So do values
//! nested deeper than [`MAX_COPY_DEPTH`] containers and guest arrays or
//! objects with more than [`MAX_COPY_LENGTH`] elements.
//!
//! Host errors thrown into the guest are remembered until the current
//! evaluation ends, so that an uncaught bridge failure can be reported to
//! the host with its original type instead of as a plain guest error.

use crate::engine::error_message;
use crate::scope::CallScope;
use boa_engine::object::builtins::JsArray;
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::{
    js_string, Context as Engine, JsError, JsNativeError, JsObject, JsResult, JsString, JsValue,
    NativeFunction,
};
use core_types::{BridgeError, BridgeResult, HostFunction, Value};
use indexmap::IndexMap;
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// Name given to host callables that are not installed under a key
const ANONYMOUS: &str = "anonymous";

/// Deepest nesting of arrays and objects copied in either direction
pub const MAX_COPY_DEPTH: usize = 128;

/// Largest guest array length or own key count copied out of the engine
pub const MAX_COPY_LENGTH: u64 = 1 << 20;

#[derive(Debug)]
struct PendingFailure {
    /// Guest string form the thrown error will have
    guest_text: String,
    error: BridgeError,
}

/// Converts values in both directions and tracks bridge failures thrown
/// into the guest.
///
/// Clones share the same failure slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct Coercion {
    pending: Rc<RefCell<Option<PendingFailure>>>,
}

impl Coercion {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Copies a host value into the engine.
    pub(crate) fn to_guest(&self, value: &Value, engine: &mut Engine) -> JsResult<JsValue> {
        self.to_guest_named(value, ANONYMOUS, engine)
    }

    /// Copies a host value into the engine; host callables found inside are
    /// labelled `name` (or their object key) in error reports.
    pub(crate) fn to_guest_named(
        &self,
        value: &Value,
        name: &str,
        engine: &mut Engine,
    ) -> JsResult<JsValue> {
        self.copy_in(value, name, 0, engine)
    }

    fn copy_in(
        &self,
        value: &Value,
        name: &str,
        depth: usize,
        engine: &mut Engine,
    ) -> JsResult<JsValue> {
        if matches!(value, Value::Array(_) | Value::Object(_)) && depth >= MAX_COPY_DEPTH {
            return Err(self.throw(too_deep()));
        }

        let converted = match value {
            Value::Null => JsValue::null(),
            Value::Boolean(b) => JsValue::from(*b),
            Value::Number(n) => JsValue::from(*n),
            Value::String(s) => JsValue::from(JsString::from(s.as_str())),
            Value::Array(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.copy_in(item, name, depth + 1, engine))
                    .collect::<JsResult<Vec<_>>>()?;
                JsArray::from_iter(elements, engine).into()
            }
            Value::Object(entries) => {
                let object = JsObject::with_object_proto(engine.intrinsics());
                for (key, entry) in entries {
                    let entry = self.copy_in(entry, key, depth + 1, engine)?;
                    object.set(JsString::from(key.as_str()), entry, true, engine)?;
                }
                object.into()
            }
            Value::Function(function) => self.host_function(name, function.clone(), engine),
        };
        Ok(converted)
    }

    /// Copies a guest value out of the engine.
    pub(crate) fn from_guest(&self, value: &JsValue, engine: &mut Engine) -> BridgeResult<Value> {
        let mut ancestors = Vec::new();
        self.copy_value(value, &mut ancestors, engine)
    }

    fn copy_value(
        &self,
        value: &JsValue,
        ancestors: &mut Vec<JsObject>,
        engine: &mut Engine,
    ) -> BridgeResult<Value> {
        if value.is_null_or_undefined() {
            return Ok(Value::Null);
        }
        if let Some(b) = value.as_boolean() {
            return Ok(Value::Boolean(b));
        }
        if let Some(n) = value.as_number() {
            return Ok(Value::Number(n));
        }
        if let Some(s) = value.as_string() {
            return Ok(Value::String(s.to_std_string_escaped()));
        }
        if value.is_symbol() {
            return Err(BridgeError::coercion("symbols cannot leave the engine"));
        }
        if value.is_bigint() {
            return Err(BridgeError::coercion("BigInt values cannot leave the engine"));
        }

        let Some(object) = value.as_object() else {
            return Err(BridgeError::coercion("unsupported guest value"));
        };
        if object.is_callable() {
            return Err(BridgeError::coercion(
                "guest functions cannot be copied, use a GuestObject handle",
            ));
        }
        if ancestors.len() >= MAX_COPY_DEPTH {
            return Err(too_deep());
        }
        if ancestors
            .iter()
            .any(|ancestor| JsObject::equals(ancestor, object))
        {
            return Err(BridgeError::coercion("cyclic structure"));
        }

        ancestors.push(object.clone());
        let copied = if object.is_array() {
            self.copy_array(object, ancestors, engine)
        } else {
            self.copy_object(object, ancestors, engine)
        };
        ancestors.pop();
        copied
    }

    fn copy_array(
        &self,
        array: &JsObject,
        ancestors: &mut Vec<JsObject>,
        engine: &mut Engine,
    ) -> BridgeResult<Value> {
        let length = array
            .get(js_string!("length"), engine)
            .and_then(|length| length.to_length(engine))
            .map_err(|e| guest_failure(&e, engine))?;
        check_length("array length", length)?;

        let mut items = Vec::new();
        for index in 0..length as usize {
            let item = array
                .get(index, engine)
                .map_err(|e| guest_failure(&e, engine))?;
            items.push(self.copy_value(&item, ancestors, engine)?);
        }
        Ok(Value::Array(items))
    }

    fn copy_object(
        &self,
        object: &JsObject,
        ancestors: &mut Vec<JsObject>,
        engine: &mut Engine,
    ) -> BridgeResult<Value> {
        let keys = object_keys(object, engine)?;

        let mut entries = IndexMap::new();
        for key in keys {
            let entry = object
                .get(key.clone(), engine)
                .map_err(|e| guest_failure(&e, engine))?;
            let entry = self.copy_value(&entry, ancestors, engine)?;
            entries.insert(key.to_std_string_escaped(), entry);
        }
        Ok(Value::Object(entries))
    }

    /// Wraps a host callable as a native guest function named `name`.
    pub(crate) fn host_function(
        &self,
        name: &str,
        function: HostFunction,
        engine: &mut Engine,
    ) -> JsValue {
        let coercion = self.clone();
        let label = name.to_string();

        // SAFETY: the captures are the failure slot, the label and the
        // callable. None of them is traced by the engine: `HostFunction`
        // closures must not capture engine values, and `GuestObject` only
        // holds a slot number in the context's handle table.
        #[allow(unsafe_code)]
        let native = unsafe {
            NativeFunction::from_closure(move |_this, args, engine| {
                let args = args
                    .iter()
                    .map(|arg| coercion.from_guest(arg, engine))
                    .collect::<BridgeResult<Vec<_>>>()
                    .map_err(|e| coercion.throw(e))?;

                trace!("calling host function '{}' with {} args", label, args.len());
                let result = {
                    let mut scope = CallScope::new(engine, &coercion);
                    function.call(&mut scope, &args)
                };

                match result {
                    Ok(value) => coercion.to_guest(&value, engine),
                    Err(error) => Err(coercion.throw(host_failure(&label, error))),
                }
            })
        };

        FunctionObjectBuilder::new(engine.realm(), native)
            .name(JsString::from(name))
            .length(0)
            .build()
            .into()
    }

    /// Turns a bridge error into a guest exception and remembers it.
    ///
    /// [`BridgeError::TypeError`] becomes a guest `TypeError`; anything
    /// else becomes a plain `Error` carrying the error's message.
    pub(crate) fn throw(&self, error: BridgeError) -> JsError {
        let (native, guest_text) = match &error {
            BridgeError::TypeError(message) => (
                JsNativeError::typ().with_message(message.clone()),
                format!("TypeError: {}", message),
            ),
            other => {
                let message = other.to_string();
                (
                    JsNativeError::error().with_message(message.clone()),
                    format!("Error: {}", message),
                )
            }
        };

        *self.pending.borrow_mut() = Some(PendingFailure { guest_text, error });
        native.into()
    }

    /// Forgets any remembered failure.
    pub(crate) fn clear(&self) {
        self.pending.borrow_mut().take();
    }

    /// Returns the remembered failure if the guest error text still matches
    /// what was thrown. The slot is emptied either way.
    pub(crate) fn take_failure(&self, guest_text: &str) -> Option<BridgeError> {
        let pending = self.pending.borrow_mut().take()?;
        (pending.guest_text == guest_text).then_some(pending.error)
    }

    /// Maps an uncaught guest exception to the error reported to the host.
    pub(crate) fn uncaught(&self, error: &JsError, engine: &mut Engine) -> BridgeError {
        let message = error_message(error, engine);
        self.take_failure(&message)
            .unwrap_or(BridgeError::GuestRuntime { message })
    }
}

/// Host errors escaping a callable are reported under the callable's name,
/// except `TypeError`s which reach the guest unchanged.
fn host_failure(name: &str, error: BridgeError) -> BridgeError {
    match error {
        BridgeError::TypeError(_) => error,
        other => BridgeError::HostCallable {
            name: name.to_string(),
            message: other.to_string(),
        },
    }
}

fn guest_failure(error: &JsError, engine: &mut Engine) -> BridgeError {
    BridgeError::GuestRuntime {
        message: error_message(error, engine),
    }
}

fn too_deep() -> BridgeError {
    BridgeError::coercion("value nested too deeply")
}

fn check_length(what: &str, length: u64) -> BridgeResult<()> {
    if length > MAX_COPY_LENGTH {
        return Err(BridgeError::coercion(format!(
            "{} {} exceeds the copy limit of {}",
            what, length, MAX_COPY_LENGTH
        )));
    }
    Ok(())
}

/// Calls the intrinsic `Object.<name>` with `args`.
pub(crate) fn call_object_intrinsic(
    name: &str,
    args: &[JsValue],
    engine: &mut Engine,
) -> JsResult<JsValue> {
    let constructor = engine.intrinsics().constructors().object().constructor();
    let function = constructor.get(JsString::from(name), engine)?;
    let Some(function) = function.as_callable() else {
        return Err(JsNativeError::typ()
            .with_message(format!("Object.{} is not a function", name))
            .into());
    };
    function.call(&JsValue::undefined(), args, engine)
}

/// Own enumerable string keys, in `Object.keys` order.
fn object_keys(object: &JsObject, engine: &mut Engine) -> BridgeResult<Vec<JsString>> {
    let keys = call_object_intrinsic("keys", &[object.clone().into()], engine)
        .map_err(|e| guest_failure(&e, engine))?;
    let Some(keys) = keys.as_object() else {
        return Ok(Vec::new());
    };

    let length = keys
        .get(js_string!("length"), engine)
        .and_then(|length| length.to_length(engine))
        .map_err(|e| guest_failure(&e, engine))?;
    check_length("key count", length)?;

    let mut names = Vec::new();
    for index in 0..length as usize {
        let name = keys
            .get(index, engine)
            .map_err(|e| guest_failure(&e, engine))?;
        if let Some(name) = name.as_string() {
            names.push(name.clone());
        }
    }
    Ok(names)
}
