//! Live guest objects obtained from loaded modules

use core_types::{BridgeError, Value};
use integration_tests::write_file;
use js_bridge::{Context, EnvSnapshot};
use module_resolver::ModuleResolver;
use tempfile::TempDir;

fn context_over(root: &std::path::Path) -> Context {
    Context::with_resolver(ModuleResolver::new([root]), EnvSnapshot::empty()).unwrap()
}

#[test]
fn test_module_exports_as_live_object() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "counter.js",
        "var count = 0;
         exports.bump = function (by) { count += by; return count; };
         exports.read = function () { return count; };",
    );

    let ctx = context_over(root.path());
    let counter = ctx.evaluate_object("require('counter')").unwrap();

    assert_eq!(counter.call_method("bump", &[Value::from(4)]).unwrap(), Value::from(4));
    assert_eq!(counter.call_method("bump", &[Value::from(1)]).unwrap(), Value::from(5));
    assert_eq!(counter.call_method("read", &[]).unwrap(), Value::from(5));
}

#[test]
fn test_exported_function_called_directly() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "concat.js",
        "module.exports = function (a, b) { return [a, b].join('-'); };",
    );

    let ctx = context_over(root.path());
    let concat = ctx.evaluate_object("require('concat')").unwrap();

    assert!(concat.is_callable());
    assert_eq!(
        concat.call(&[Value::from("x"), Value::from(1)]).unwrap(),
        Value::from("x-1")
    );
}

#[test]
fn test_guest_type_error_from_module_function() {
    let root = TempDir::new().unwrap();
    write_file(
        root.path(),
        "strict.js",
        "exports.check = function (v) {
             if (typeof v !== 'string') throw new TypeError('expected a string');
             return v;
         };",
    );

    let ctx = context_over(root.path());
    let strict = ctx.evaluate_object("require('strict')").unwrap();

    assert!(matches!(
        strict.call_method("check", &[Value::from(3)]),
        Err(BridgeError::TypeError(message)) if message == "expected a string"
    ));
}

#[test]
fn test_handle_outlived_by_context_close() {
    let root = TempDir::new().unwrap();
    write_file(root.path(), "data.js", "exports.items = [1, 2, 3];");

    let ctx = context_over(root.path());
    let items = ctx
        .evaluate_object("require('data')")
        .unwrap()
        .get_object("items")
        .unwrap();
    assert_eq!(items.length().unwrap(), Value::from(3));

    ctx.close();
    assert!(matches!(items.length(), Err(BridgeError::ContextDestroyed)));
}
