//! Host-side representation of guest values.
//!
//! Values cross the boundary by structured copy: a [`Value`] is a
//! self-contained tree with no references back into the engine heap.
//! Mutating a `Value` never affects guest state and vice versa.

use crate::{BridgeError, BridgeResult, HostFunction};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A JavaScript value copied to (or destined for) the host.
///
/// Guest `undefined` and `null` both map to [`Value::Null`]. Numbers are
/// always IEEE 754 doubles, matching JavaScript semantics.
///
/// [`Value::Function`] only travels host → guest: it wraps a
/// [`HostFunction`] that becomes a callable guest function. Guest
/// functions never come back as values.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let list = Value::from(vec![1, 2, 3]);
/// assert_eq!(list.type_of(), "object");
/// assert_eq!(list.to_string(), "[1,2,3]");
///
/// let parsed: Value = serde_json::from_str(r#"{"value": 8}"#).unwrap();
/// assert_eq!(parsed, Value::object([("value", 8)]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JavaScript `null` (also used for `undefined`)
    #[default]
    Null,
    /// JavaScript boolean
    Boolean(bool),
    /// JavaScript number
    Number(f64),
    /// JavaScript string
    String(String),
    /// JavaScript array, order preserved
    Array(Vec<Value>),
    /// Plain JavaScript object, own enumerable string keys
    Object(IndexMap<String, Value>),
    /// Host callable exposed as a guest function
    #[serde(skip)]
    Function(HostFunction),
}

impl Value {
    /// Builds an object value from key/value pairs.
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds an array value.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Returns true for `null`/`undefined`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the host function, if this is one.
    pub fn as_function(&self) -> Option<&HostFunction> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Looks up `key` in an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// Returns the JavaScript `typeof` result the guest would see.
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert_eq!(Value::Null.type_of(), "object");
    /// assert_eq!(Value::from(1.5).type_of(), "number");
    /// assert_eq!(Value::from("x").type_of(), "string");
    /// ```
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Null => "object", // JavaScript quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Converts to a `serde_json::Value`.
    ///
    /// Integral numbers are written as JSON integers.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Coercion`] if the tree contains a host
    /// function or a non-finite number.
    pub fn to_json(&self) -> BridgeResult<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if is_safe_integer(*n) => serde_json::Value::from(*n as i64),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .ok_or_else(|| BridgeError::coercion(format!("{} has no JSON form", n)))?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<BridgeResult<_>>()?,
            ),
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), value.to_json()?)))
                    .collect::<BridgeResult<_>>()?,
            ),
            Value::Function(_) => {
                return Err(BridgeError::coercion("host functions have no JSON form"))
            }
        })
    }
}

/// Integral and exactly representable, like `Number.isSafeInteger`.
fn is_safe_integer(n: f64) -> bool {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(entries) => Value::object(entries),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Object(entries)
    }
}

impl From<HostFunction> for Value {
    fn from(f: HostFunction) -> Self {
        Value::Function(f)
    }
}

/// Formats a number the way JavaScript's `String()` does for common cases.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        if n.is_sign_positive() {
            write!(f, "Infinity")
        } else {
            write!(f, "-Infinity")
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        // Integer-valued doubles display without decimal point
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
        other => write!(f, "{}", other),
    }
}

/// Compact, JSON-like rendering.
///
/// Top-level strings print bare; strings nested in arrays or objects are
/// quoted.
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::from("lemon").to_string(), "lemon");
/// assert_eq!(Value::object([("a", "b")]).to_string(), r#"{"a":"b"}"#);
/// assert_eq!(Value::from(10.0).to_string(), "10");
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write_nested(f, item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:", serde_json::Value::String(key.clone()))?;
                    write_nested(f, item)?;
                }
                write!(f, "}}")
            }
            Value::Function(_) => write!(f, "function () {{ [host code] }}"),
        }
    }
}
