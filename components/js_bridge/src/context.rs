//! The embedding context: one engine plus its installed globals.

use crate::coercion::{call_object_intrinsic, Coercion};
use crate::config::BridgeConfig;
use crate::engine::{with_engine, EngineCell};
use crate::env::EnvSnapshot;
use crate::handles::HandleTable;
use crate::loader::Loader;
use crate::proxy::GuestObject;
use boa_engine::context::ContextBuilder;
use boa_engine::{js_string, Context as Engine, JsObject, JsResult, JsString, JsValue, Source};
use core_types::{BridgeError, BridgeResult, Value};
use indexmap::IndexMap;
use log::debug;
use module_resolver::{HostModuleRegistry, ModuleResolver};
use std::cell::RefCell;
use std::rc::Rc;

/// Statement separator used when a [`Script`] is built from several parts
pub const STATEMENT_SEPARATOR: &str = ";\n";

/// Global name under which per-call bindings are visible
pub const BINDING_GLOBAL: &str = "binding";

/// Source code for one evaluation.
///
/// Built from a single string or from a sequence of statements, which are
/// joined with [`STATEMENT_SEPARATOR`].
///
/// ```
/// use js_bridge::Script;
///
/// let script = Script::from(vec!["var o = {value: 5}", "o.value += 3", "o"]);
/// assert_eq!(script.source(), "var o = {value: 5};\no.value += 3;\no");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script(String);

impl Script {
    /// The source text.
    pub fn source(&self) -> &str {
        &self.0
    }

    fn join<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<S> = parts.into_iter().collect();
        let parts: Vec<&str> = parts.iter().map(AsRef::as_ref).collect();
        Script(parts.join(STATEMENT_SEPARATOR))
    }
}

impl From<&str> for Script {
    fn from(source: &str) -> Self {
        Script(source.to_string())
    }
}

impl From<String> for Script {
    fn from(source: String) -> Self {
        Script(source)
    }
}

impl From<&String> for Script {
    fn from(source: &String) -> Self {
        Script(source.clone())
    }
}

impl From<Vec<&str>> for Script {
    fn from(parts: Vec<&str>) -> Self {
        Script::join(parts)
    }
}

impl From<Vec<String>> for Script {
    fn from(parts: Vec<String>) -> Self {
        Script::join(parts)
    }
}

impl From<&[&str]> for Script {
    fn from(parts: &[&str]) -> Self {
        Script::join(parts)
    }
}

impl<const N: usize> From<[&str; N]> for Script {
    fn from(parts: [&str; N]) -> Self {
        Script::join(parts)
    }
}

/// Named values visible to one evaluation as the global `binding`.
///
/// ```
/// use js_bridge::Bindings;
///
/// let bindings = Bindings::new().with("value", 7);
/// assert_eq!(bindings.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(IndexMap<String, Value>);

impl Bindings {
    /// No bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Looks up a binding.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<IndexMap<String, Value>> for Bindings {
    fn from(map: IndexMap<String, Value>) -> Self {
        Bindings(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Bindings(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One JavaScript engine instance with its globals and optional resolver.
///
/// The engine is destroyed exactly once, by [`Context::close`] or on drop.
/// [`GuestObject`] handles outliving it report
/// [`BridgeError::ContextDestroyed`].
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use js_bridge::{Bindings, Context};
///
/// let mut ctx = Context::new().unwrap();
/// ctx.define_global("base", 10).unwrap();
///
/// let result = ctx
///     .evaluate("base + binding.value", Bindings::new().with("value", 5))
///     .unwrap();
/// assert_eq!(result, Value::from(15));
/// ```
pub struct Context {
    engine: Rc<EngineCell>,
    handles: Rc<HandleTable>,
    coercion: Coercion,
    globals: IndexMap<String, Value>,
    resolver: Option<Rc<ModuleResolver>>,
}

impl Context {
    /// Creates a context without `require`.
    pub fn new() -> BridgeResult<Self> {
        let engine = ContextBuilder::new()
            .build()
            .map_err(|e| BridgeError::host(format!("cannot create engine: {}", e)))?;

        Ok(Self {
            engine: Rc::new(RefCell::new(Some(engine))),
            handles: Rc::new(HandleTable::new()),
            coercion: Coercion::new(),
            globals: IndexMap::new(),
            resolver: None,
        })
    }

    /// Creates a context with a global `require` backed by `resolver` and a
    /// frozen `process.env` built from `env`.
    pub fn with_resolver(resolver: ModuleResolver, env: EnvSnapshot) -> BridgeResult<Self> {
        let mut ctx = Self::new()?;
        let resolver = Rc::new(resolver);
        debug!(
            "installing require over {} search roots",
            resolver.roots().len()
        );

        let loader = Loader::new(resolver.clone(), ctx.coercion.clone());
        with_engine(&ctx.engine, |engine| {
            install_require(&loader, engine)
                .and_then(|_| install_process(&env, &ctx.coercion, engine))
                .map_err(|e| ctx.coercion.uncaught(&e, engine))
        })?;

        ctx.resolver = Some(resolver);
        Ok(ctx)
    }

    /// Creates a context as described by `config`.
    pub fn from_config(config: &BridgeConfig, registry: HostModuleRegistry) -> BridgeResult<Self> {
        match config.resolver(registry) {
            Some(resolver) => {
                let env = if config.snapshot_env {
                    EnvSnapshot::capture()
                } else {
                    EnvSnapshot::empty()
                };
                Self::with_resolver(resolver, env)
            }
            None => Self::new(),
        }
    }

    /// Evaluates `code` and copies its completion value.
    ///
    /// `bindings` is visible as the global `binding` during this call only;
    /// a previous `binding` global is restored afterwards.
    ///
    /// # Errors
    ///
    /// An uncaught guest exception becomes [`BridgeError::GuestRuntime`]
    /// carrying the exception's string form, unless it is a bridge failure
    /// (a missing module, a failing host callable) that propagated
    /// unchanged, in which case that original error is returned.
    pub fn evaluate(&self, code: impl Into<Script>, bindings: Bindings) -> BridgeResult<Value> {
        let script = code.into();
        let binding = bindings.into_value();
        let coercion = &self.coercion;

        with_engine(&self.engine, |engine| {
            coercion.clear();
            let installed = coercion
                .to_guest_named(&binding, BINDING_GLOBAL, engine)
                .and_then(|guest| swap_global(BINDING_GLOBAL, Some(guest), engine))
                .map_err(|e| coercion.uncaught(&e, engine))?;

            let result = engine.eval(Source::from_bytes(script.source()));

            swap_global(BINDING_GLOBAL, installed, engine)
                .map_err(|e| coercion.uncaught(&e, engine))?;

            let value = result.map_err(|e| coercion.uncaught(&e, engine))?;
            coercion.from_guest(&value, engine)
        })
    }

    /// Evaluates `code` without bindings.
    pub fn eval(&self, code: impl Into<Script>) -> BridgeResult<Value> {
        self.evaluate(code, Bindings::new())
    }

    /// Defines (or redefines) a global visible to every later evaluation.
    pub fn define_global(&mut self, name: &str, value: impl Into<Value>) -> BridgeResult<()> {
        let value = value.into();
        let coercion = &self.coercion;

        with_engine(&self.engine, |engine| {
            coercion
                .to_guest_named(&value, name, engine)
                .and_then(|converted| swap_global(name, Some(converted), engine))
                .map_err(|e| coercion.uncaught(&e, engine))
        })?;

        debug!("defined global '{}' ({})", name, value.type_of());
        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    /// Globals defined through [`Context::define_global`], in definition order.
    pub fn globals(&self) -> &IndexMap<String, Value> {
        &self.globals
    }

    /// The installed resolver, if `require` is available.
    pub fn resolver(&self) -> Option<&ModuleResolver> {
        self.resolver.as_deref()
    }

    /// Evaluates `code` and returns a live handle to the resulting object
    /// or function.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Coercion`] if the completion value is not an object.
    pub fn evaluate_object(&self, code: impl Into<Script>) -> BridgeResult<GuestObject> {
        let script = code.into();
        let coercion = &self.coercion;

        let object = with_engine(&self.engine, |engine| {
            coercion.clear();
            let value = engine
                .eval(Source::from_bytes(script.source()))
                .map_err(|e| coercion.uncaught(&e, engine))?;
            expect_object(&value, "evaluation result")
        })?;
        Ok(self.handle(object))
    }

    /// Returns a live handle to the global `name`.
    pub fn global_object(&self, name: &str) -> BridgeResult<GuestObject> {
        let coercion = &self.coercion;
        let object = with_engine(&self.engine, |engine| {
            let global = engine.global_object();
            let value = global
                .get(JsString::from(name), engine)
                .map_err(|e| coercion.uncaught(&e, engine))?;
            expect_object(&value, &format!("global '{}'", name))
        })?;
        Ok(self.handle(object))
    }

    /// Returns true until the context is closed.
    pub fn is_alive(&self) -> bool {
        self.engine
            .try_borrow()
            .map(|slot| slot.is_some())
            .unwrap_or(true)
    }

    /// Number of guest objects currently held by live [`GuestObject`]s.
    pub fn live_handles(&self) -> usize {
        self.handles.live()
    }

    /// Destroys the engine. Outstanding handles become unusable.
    pub fn close(self) {
        drop(self);
    }

    fn handle(&self, object: JsObject) -> GuestObject {
        GuestObject::new(
            object,
            &self.handles,
            Rc::downgrade(&self.engine),
            self.coercion.clone(),
        )
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.handles.clear();
        if let Ok(mut slot) = self.engine.try_borrow_mut() {
            if slot.take().is_some() {
                debug!("engine destroyed");
            }
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .field("require", &self.resolver.is_some())
            .finish()
    }
}

/// Evaluates `code` in a fresh [`Context`] and returns the copied result.
///
/// ```
/// use core_types::Value;
/// use js_bridge::{evaljs, Bindings};
///
/// let result = evaljs("binding['value'] + 3", Bindings::new().with("value", 7)).unwrap();
/// assert_eq!(result, Value::from(10));
/// ```
pub fn evaljs(code: impl Into<Script>, bindings: Bindings) -> BridgeResult<Value> {
    Context::new()?.evaluate(code, bindings)
}

/// Sets (or with `None` removes) a global and returns its previous own value.
fn swap_global(
    name: &str,
    value: Option<JsValue>,
    engine: &mut Engine,
) -> JsResult<Option<JsValue>> {
    let global = engine.global_object();
    let key = JsString::from(name);

    let previous = if global.has_own_property(key.clone(), engine)? {
        Some(global.get(key.clone(), engine)?)
    } else {
        None
    };

    match value {
        Some(value) => {
            global.set(key, value, true, engine)?;
        }
        None => {
            global.delete_property_or_throw(key, engine)?;
        }
    }
    Ok(previous)
}

fn install_require(loader: &Loader, engine: &mut Engine) -> JsResult<()> {
    let require = loader.require_function(None, engine);
    swap_global("require", Some(require), engine).map(|_| ())
}

/// Installs `process.env` as a frozen copy of `env`.
fn install_process(env: &EnvSnapshot, coercion: &Coercion, engine: &mut Engine) -> JsResult<()> {
    let vars = coercion.to_guest(&env.to_value(), engine)?;
    call_object_intrinsic("freeze", &[vars.clone()], engine)?;

    let process = JsObject::with_object_proto(engine.intrinsics());
    process.set(js_string!("env"), vars, true, engine)?;
    swap_global("process", Some(process.into()), engine).map(|_| ())
}

fn expect_object(value: &JsValue, what: &str) -> BridgeResult<JsObject> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| BridgeError::coercion(format!("{} is not an object", what)))
}
