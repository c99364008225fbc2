//! The guest `require` function.
//!
//! Each `require` is a native function bound to the id of the module that
//! owns it (`None` for top-level code). Calling it resolves the request
//! through the [`ModuleResolver`] and either runs the module source inside
//! its CommonJS wrapper or copies a host module's exports.

use crate::coercion::Coercion;
use boa_engine::object::FunctionObjectBuilder;
use boa_engine::{
    js_string, Context as Engine, JsNativeError, JsObject, JsResult, JsString, JsValue,
    NativeFunction, Source,
};
use log::debug;
use module_resolver::{HostExports, ModuleId, ModuleResolver, ResolvedModule, SourceModule};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub(crate) struct Loader {
    resolver: Rc<ModuleResolver>,
    coercion: Coercion,
}

impl Loader {
    pub(crate) fn new(resolver: Rc<ModuleResolver>, coercion: Coercion) -> Self {
        Self { resolver, coercion }
    }

    /// Builds a `require` function whose requests are chained onto `parent`.
    pub(crate) fn require_function(&self, parent: Option<ModuleId>, engine: &mut Engine) -> JsValue {
        let loader = self.clone();

        // SAFETY: the captures are the resolver, the failure slot and a
        // module id. Host modules inside the resolver hold `Value`s and
        // `HostFunction`s, which carry no engine values (see `host_function`
        // in the coercion module).
        #[allow(unsafe_code)]
        let native = unsafe {
            NativeFunction::from_closure(move |_this, args, engine| {
                loader.require(parent.as_ref(), args, engine)
            })
        };

        FunctionObjectBuilder::new(engine.realm(), native)
            .name(js_string!("require"))
            .length(1)
            .build()
            .into()
    }

    fn require(
        &self,
        parent: Option<&ModuleId>,
        args: &[JsValue],
        engine: &mut Engine,
    ) -> JsResult<JsValue> {
        let Some(requested) = args.first().and_then(JsValue::as_string) else {
            return Err(JsNativeError::typ()
                .with_message("require expects a module id string")
                .into());
        };
        let requested = requested.to_std_string_escaped();
        let id = self.resolver.effective_id(parent, &requested);

        match self.resolver.resolve(&id) {
            Ok(ResolvedModule::Source(module)) => self.instantiate(module, engine),
            Ok(ResolvedModule::Host(host)) => self.host_exports(host, engine),
            Err(error) => Err(self.coercion.throw(error)),
        }
    }

    /// Runs a module's wrapper and returns its `module.exports`.
    fn instantiate(&self, module: SourceModule, engine: &mut Engine) -> JsResult<JsValue> {
        debug!("loading {} as '{}'", module.path.display(), module.id);

        let wrapper = engine.eval(Source::from_bytes(&module.wrapped()))?;
        let Some(wrapper) = wrapper.as_callable().cloned() else {
            return Err(JsNativeError::typ()
                .with_message(format!("module '{}' did not compile to a function", module.id))
                .into());
        };

        let exports = JsObject::with_object_proto(engine.intrinsics());
        let module_object = JsObject::with_object_proto(engine.intrinsics());
        module_object.set(js_string!("exports"), exports.clone(), true, engine)?;
        module_object.set(
            js_string!("id"),
            JsString::from(module.id.as_str()),
            true,
            engine,
        )?;

        let require = self.require_function(Some(module.id.clone()), engine);
        let filename = JsString::from(&*module.path.to_string_lossy());
        let dirname = JsString::from(&*module.directory().to_string_lossy());

        wrapper.call(
            &exports.clone().into(),
            &[
                require,
                exports.into(),
                module_object.clone().into(),
                filename.into(),
                dirname.into(),
            ],
            engine,
        )?;

        module_object.get(js_string!("exports"), engine)
    }

    /// Copies a host module's public attributes into a fresh exports object.
    fn host_exports(&self, host: HostExports, engine: &mut Engine) -> JsResult<JsValue> {
        debug!("populating exports of host module {}", host.name);

        let exports = JsObject::with_object_proto(engine.intrinsics());
        for (name, value) in &host.exports {
            let value = self.coercion.to_guest_named(value, name, engine)?;
            exports.set(JsString::from(name.as_str()), value, true, engine)?;
        }
        Ok(exports.into())
    }
}
