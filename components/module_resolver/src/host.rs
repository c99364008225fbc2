//! Host modules that guest code can `require`.
//!
//! A host module is a named bag of attributes (values and host functions).
//! When guest code requires `host/<name>`, the attributes that form the
//! module's public surface are copied into the guest `exports` object.

use core_types::{BridgeError, BridgeResult, GuestScope, HostFunction, Value};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Attribute names starting with this marker are private
pub const PRIVATE_MARKER: char = '_';

/// A host module's attributes and optional explicit export list.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use module_resolver::HostModule;
///
/// let module = HostModule::new()
///     .attribute("version", "1.0")
///     .attribute("_cache", Value::Null)
///     .function("shout", |_scope, args| {
///         let text = args.first().and_then(Value::as_str).unwrap_or_default();
///         Ok(Value::from(text.to_uppercase()))
///     });
///
/// let names: Vec<String> = module
///     .public_exports("text")
///     .unwrap()
///     .into_iter()
///     .map(|(name, _)| name)
///     .collect();
/// assert_eq!(names, vec!["version", "shout"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostModule {
    attributes: IndexMap<String, Value>,
    exports: Option<Vec<String>>,
}

impl HostModule {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds a host function attribute.
    pub fn function<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn GuestScope, &[Value]) -> BridgeResult<Value> + 'static,
    {
        self.attribute(name, HostFunction::new(f))
    }

    /// Declares the exact list of exported names.
    ///
    /// Without a declaration every attribute not starting with
    /// [`PRIVATE_MARKER`] is exported.
    pub fn with_exports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// All attributes, in insertion order.
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// The declared export list, if any.
    pub fn declared_exports(&self) -> Option<&[String]> {
        self.exports.as_deref()
    }

    /// Returns the attributes that form the module's public surface.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingExport`] when the declared export list
    /// names an attribute the module does not have.
    pub fn public_exports(&self, module_name: &str) -> BridgeResult<Vec<(String, Value)>> {
        match &self.exports {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.attributes
                        .get(name)
                        .map(|value| (name.clone(), value.clone()))
                        .ok_or_else(|| BridgeError::MissingExport {
                            module: module_name.to_string(),
                            name: name.clone(),
                        })
                })
                .collect(),
            None => Ok(self
                .attributes
                .iter()
                .filter(|(name, _)| !name.starts_with(PRIVATE_MARKER))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()),
        }
    }
}

type Loader = Rc<dyn Fn() -> BridgeResult<HostModule>>;

#[derive(Clone)]
enum Entry {
    Ready(HostModule),
    Lazy(Loader),
}

/// Named host modules available for import.
#[derive(Clone, Default)]
pub struct HostModuleRegistry {
    entries: IndexMap<String, Entry>,
}

impl HostModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-made module under `name` (e.g. `"text::case"`).
    pub fn register(&mut self, name: impl Into<String>, module: HostModule) -> &mut Self {
        self.entries.insert(name.into(), Entry::Ready(module));
        self
    }

    /// Registers a module built on each import. A failing loader is treated
    /// as an import failure.
    pub fn register_lazy<F>(&mut self, name: impl Into<String>, loader: F) -> &mut Self
    where
        F: Fn() -> BridgeResult<HostModule> + 'static,
    {
        self.entries
            .insert(name.into(), Entry::Lazy(Rc::new(loader)));
        self
    }

    /// Returns true if a module is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered module names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Imports the module registered under `name`.
    ///
    /// # Errors
    ///
    /// [`BridgeError::ModuleNotFound`] if nothing is registered, or the
    /// loader's own error.
    pub fn import(&self, name: &str) -> BridgeResult<HostModule> {
        match self.entries.get(name) {
            Some(Entry::Ready(module)) => Ok(module.clone()),
            Some(Entry::Lazy(loader)) => loader(),
            None => Err(BridgeError::ModuleNotFound {
                id: name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for HostModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostModuleRegistry")
            .field("modules", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
