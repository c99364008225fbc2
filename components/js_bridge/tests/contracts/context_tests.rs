//! Contract tests for Context evaluation, globals and host callables

use core_types::{BridgeError, HostFunction, Value};
use js_bridge::{evaljs, Bindings, Context};

#[test]
fn test_statement_sequence_returns_last_value() {
    let ctx = Context::new().unwrap();
    let result = ctx
        .eval(vec!["var o = {value: 5}", "o.value += 3", "o"])
        .unwrap();
    assert_eq!(result, Value::object([("value", 8)]));
}

#[test]
fn test_binding_is_visible() {
    let result = evaljs("binding['value'] + 3", Bindings::new().with("value", 7)).unwrap();
    assert_eq!(result, Value::from(10));
}

#[test]
fn test_binding_is_transient() {
    let ctx = Context::new().unwrap();
    ctx.evaluate("binding.a", Bindings::new().with("a", 1))
        .unwrap();
    let result = ctx
        .evaluate("binding.a === undefined", Bindings::new().with("b", 2))
        .unwrap();
    assert_eq!(result, Value::from(true));
}

#[test]
fn test_previous_binding_global_restored() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("binding", "keep").unwrap();

    let inside = ctx
        .evaluate("binding.x", Bindings::new().with("x", 3))
        .unwrap();
    assert_eq!(inside, Value::from(3));

    let global = ctx.evaluate_object("globalThis").unwrap();
    assert_eq!(global.get("binding").unwrap(), Value::from("keep"));
}

#[test]
fn test_globals_persist_and_keep_order() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("a", 1).unwrap();
    ctx.define_global("b", "two").unwrap();
    ctx.define_global("a", 10).unwrap();

    let names: Vec<&String> = ctx.globals().keys().collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(ctx.globals()["a"], Value::from(10));
    assert_eq!(ctx.eval("a + b").unwrap(), Value::from("10two"));
    assert_eq!(ctx.eval("a * 2").unwrap(), Value::from(20));
}

#[test]
fn test_guest_state_persists_between_evaluations() {
    let ctx = Context::new().unwrap();
    ctx.eval("var counter = 1").unwrap();
    ctx.eval("counter += 1").unwrap();
    assert_eq!(ctx.eval("counter").unwrap(), Value::from(2));
}

#[test]
fn test_uncaught_throw_is_guest_runtime() {
    let ctx = Context::new().unwrap();
    match ctx.eval("throw new Error('boom')") {
        Err(BridgeError::GuestRuntime { message }) => assert_eq!(message, "Error: boom"),
        other => panic!("expected GuestRuntime, got {:?}", other),
    }
}

#[test]
fn test_thrown_primitive_keeps_text() {
    let ctx = Context::new().unwrap();
    assert!(matches!(
        ctx.eval("throw 'plain'"),
        Err(BridgeError::GuestRuntime { message }) if message == "plain"
    ));
}

#[test]
fn test_syntax_error_is_guest_runtime() {
    let ctx = Context::new().unwrap();
    assert!(matches!(
        ctx.eval("var = ;"),
        Err(BridgeError::GuestRuntime { message }) if message.starts_with("SyntaxError")
    ));
}

#[test]
fn test_host_callable_receives_copied_arguments() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global(
        "sum",
        HostFunction::from_fn(|args| {
            let total: f64 = args
                .iter()
                .flat_map(|arg| match arg {
                    Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
                    other => other.as_f64().into_iter().collect::<Vec<_>>(),
                })
                .sum();
            Ok(Value::from(total))
        }),
    )
    .unwrap();

    assert_eq!(ctx.eval("sum(1, [2, 3], 4)").unwrap(), Value::from(10));
}

#[test]
fn test_host_callable_error_uncaught() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("fail", HostFunction::from_fn(|_| Err(BridgeError::host("nope"))))
        .unwrap();

    match ctx.eval("fail()") {
        Err(BridgeError::HostCallable { name, message }) => {
            assert_eq!(name, "fail");
            assert_eq!(message, "nope");
        }
        other => panic!("expected HostCallable, got {:?}", other),
    }
}

#[test]
fn test_host_callable_error_catchable() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("fail", HostFunction::from_fn(|_| Err(BridgeError::host("nope"))))
        .unwrap();

    let message = ctx
        .eval("try { fail(); 'unreached' } catch (e) { e.message }")
        .unwrap();
    assert_eq!(message, Value::from("host function 'fail' failed: nope"));
}

#[test]
fn test_caught_and_replaced_error_is_guest_runtime() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("fail", HostFunction::from_fn(|_| Err(BridgeError::host("nope"))))
        .unwrap();

    assert!(matches!(
        ctx.eval("try { fail() } catch (e) { throw new Error('other') }"),
        Err(BridgeError::GuestRuntime { message }) if message == "Error: other"
    ));
}

#[test]
fn test_host_type_error_reaches_guest_as_type_error() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global(
        "strict",
        HostFunction::from_fn(|_| Err(BridgeError::TypeError("expected a number".to_string()))),
    )
    .unwrap();

    let caught = ctx
        .eval("try { strict() } catch (e) { (e instanceof TypeError) + ':' + e.message }")
        .unwrap();
    assert_eq!(caught, Value::from("true:expected a number"));

    assert!(matches!(
        ctx.eval("strict()"),
        Err(BridgeError::TypeError(message)) if message == "expected a number"
    ));
}

#[test]
fn test_reentrant_host_callable() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global("base", 21).unwrap();
    ctx.define_global(
        "doubled",
        HostFunction::new(|scope, _args| {
            let base = scope.global("base")?;
            scope.evaluate(&format!("{} * 2", base))
        }),
    )
    .unwrap();

    assert_eq!(ctx.eval("doubled() + 1").unwrap(), Value::from(43));
}

#[test]
fn test_reentrant_failure_surfaces_through_callable() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global(
        "nested",
        HostFunction::new(|scope, _args| scope.evaluate("throw new Error('inner')")),
    )
    .unwrap();

    match ctx.eval("nested()") {
        Err(BridgeError::HostCallable { name, message }) => {
            assert_eq!(name, "nested");
            assert_eq!(message, "Error: inner");
        }
        other => panic!("expected HostCallable, got {:?}", other),
    }
}

#[test]
fn test_host_callable_calls_guest_function() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global(
        "notify",
        HostFunction::new(|scope, args| scope.call_global("onEvent", args)),
    )
    .unwrap();

    let result = ctx
        .eval("function onEvent(a, b) { return {sum: a + b}; } notify(2, 3)")
        .unwrap();
    assert_eq!(result, Value::object([("sum", 5)]));
}

#[test]
fn test_call_global_requires_function() {
    let mut ctx = Context::new().unwrap();
    ctx.define_global(
        "fire",
        HostFunction::new(|scope, _args| scope.call_global("missing", &[])),
    )
    .unwrap();

    assert!(matches!(
        ctx.eval("fire()"),
        Err(BridgeError::TypeError(message)) if message == "missing is not a function"
    ));
}

#[test]
fn test_evaljs_uses_fresh_context() {
    evaljs("var leaked = 1", Bindings::new()).unwrap();
    assert_eq!(
        evaljs("typeof leaked", Bindings::new()).unwrap(),
        Value::from("undefined")
    );
}

#[test]
fn test_plain_context_has_no_require() {
    let ctx = Context::new().unwrap();
    assert!(ctx.resolver().is_none());
    assert_eq!(ctx.eval("typeof require").unwrap(), Value::from("undefined"));
    assert_eq!(ctx.eval("typeof process").unwrap(), Value::from("undefined"));
}
