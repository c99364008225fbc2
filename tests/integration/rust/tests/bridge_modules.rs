//! Module loading through the resolver and the bridge together
//!
//! Covers plugin chains across packages, host modules calling back into
//! the guest, and failures crossing both layers.

use core_types::{BridgeError, GuestScope, Value};
use integration_tests::write_file;
use js_bridge::{Bindings, Context, EnvSnapshot};
use module_resolver::{HostModule, HostModuleRegistry, ModuleResolver};
use tempfile::TempDir;

fn context_over(roots: &[&std::path::Path], registry: HostModuleRegistry) -> Context {
    let resolver = ModuleResolver::new(roots.iter().copied()).with_host_modules(registry);
    Context::with_resolver(resolver, EnvSnapshot::empty()).unwrap()
}

#[test]
fn test_package_chain_reaches_private_helper() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "toolkit/package.json",
        r#"{"main": "lib/entry.js"}"#,
    );
    write_file(
        root.path(),
        "toolkit/lib/entry.js",
        "module.exports = { label: require('./label').text };",
    );
    write_file(
        root.path(),
        "toolkit/lib/label.js",
        "exports.text = 'from ' + require('./node_modules/brand').name;",
    );
    write_file(
        root.path(),
        "toolkit/lib/node_modules/brand.js",
        "exports.name = 'brand';",
    );

    let ctx = context_over(&[root.path()], HostModuleRegistry::new());
    assert_eq!(
        ctx.eval("require('toolkit').label").unwrap(),
        Value::from("from brand")
    );
}

#[test]
fn test_chain_falls_back_to_roots_for_bare_segments() {
    let app = TempDir::new().unwrap();
    let shared = TempDir::new().unwrap();
    write_file(
        app.path(),
        "feature/index.js",
        "module.exports = require('util').tag + '/' + require('./local').tag;",
    );
    write_file(app.path(), "feature/local.js", "exports.tag = 'local';");
    write_file(shared.path(), "util.js", "exports.tag = 'shared';");

    let ctx = context_over(&[app.path(), shared.path()], HostModuleRegistry::new());
    assert_eq!(
        ctx.eval("require('feature')").unwrap(),
        Value::from("shared/local")
    );
}

#[test]
fn test_missing_dependency_inside_module() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "broken.js", "require('./absent');");

    let ctx = context_over(&[root.path()], HostModuleRegistry::new());
    let error = ctx.eval("require('broken')").unwrap_err();

    assert!(matches!(
        error,
        BridgeError::ModuleNotFound { id } if id == "broken!./absent"
    ));
}

#[test]
fn test_host_module_calls_back_into_guest() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "config.js",
        "module.exports = { greeting: require('host/text/case').upper('hello') };",
    );

    let mut registry = HostModuleRegistry::new();
    registry.register(
        "text::case",
        HostModule::new()
            .function("upper", |_scope, args| {
                let text = args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(Value::from(text.to_uppercase()))
            })
            .function("guestVersion", |scope: &mut dyn GuestScope, _args| {
                scope.global("VERSION")
            }),
    );

    let ctx = context_over(&[root.path()], registry);
    ctx.eval("var VERSION = '2.1';").unwrap();

    assert_eq!(
        ctx.eval("require('config').greeting").unwrap(),
        Value::from("HELLO")
    );
    assert_eq!(
        ctx.eval("require('host/text/case').guestVersion()").unwrap(),
        Value::from("2.1")
    );
}

#[test]
fn test_lazy_host_module_failure_falls_through_to_file() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "host/flaky.js", "module.exports = 'file fallback';");

    let mut registry = HostModuleRegistry::new();
    registry.register_lazy("flaky", || {
        Err(BridgeError::host("native library unavailable"))
    });

    let ctx = context_over(&[root.path()], registry);
    assert_eq!(
        ctx.eval("require('host/flaky')").unwrap(),
        Value::from("file fallback")
    );
}

#[test]
fn test_bindings_reach_loaded_modules() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "scale.js",
        "module.exports = function (n) { return n * binding.factor; };",
    );

    let ctx = context_over(&[root.path()], HostModuleRegistry::new());
    let result = ctx
        .evaluate(
            "require('scale')(binding.value)",
            Bindings::new().with("factor", 3).with("value", 5),
        )
        .unwrap();
    assert_eq!(result, Value::from(15));
}

#[test]
fn test_modules_are_not_cached() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "stamp.js", "module.exports = 'first';");

    let first = context_over(&[root.path()], HostModuleRegistry::new());
    assert_eq!(first.eval("require('stamp')").unwrap(), Value::from("first"));

    write_file(root.path(), "stamp.js", "module.exports = 'second';");
    assert_eq!(first.eval("require('stamp')").unwrap(), Value::from("second"));
}
