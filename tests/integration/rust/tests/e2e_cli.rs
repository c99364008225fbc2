//! End-to-End CLI Integration Tests
//!
//! Drives the js_cli Runtime from parsed arguments against scripts on
//! disk. This is the highest level integration test.

use clap::Parser as ClapParser;
use core_types::{BridgeError, Value};
use integration_tests::write_file;
use js_cli::{Cli, CliError, CliResult, Runtime};
use tempfile::TempDir;

fn run(args: &[&str]) -> CliResult<Value> {
    let mut argv = vec!["jsbridge"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let config = cli.bridge_config()?;
    let mut runtime = Runtime::new(&config)?;
    match (&cli.file, &cli.eval) {
        (Some(file), _) => runtime.execute_file(file),
        (None, Some(code)) => runtime.execute_string(code),
        (None, None) => Ok(Value::Null),
    }
}

#[test]
fn test_e2e_eval_expression() {
    assert_eq!(run(&["-e", "(10 + 20) * 2 - 18"]).unwrap(), Value::from(42));
}

#[test]
fn test_e2e_script_with_package_dependency() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "app/main.js", "require('greeter').greet('world')");
    write_file(
        dir.path(),
        "app/node_modules/greeter/package.json",
        r#"{"main": "src/greeter"}"#,
    );
    write_file(
        dir.path(),
        "app/node_modules/greeter/src/greeter.js",
        "exports.greet = function (who) { return 'hello ' + who; };",
    );
    let vendor = dir.path().join("app").join("node_modules");

    let script = dir.path().join("app").join("main.js");
    let result = run(&[
        "-f",
        script.to_str().unwrap(),
        "-I",
        vendor.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(result, Value::from("hello world"));
}

#[test]
fn test_e2e_host_modules_flag() {
    let code = "require('host/path').join('/srv', 'app', '..', 'lib')";

    assert!(run(&["-e", code]).is_err());
    assert_eq!(
        run(&["--host-modules", "-e", code]).unwrap(),
        Value::from("/srv/lib")
    );
}

#[test]
fn test_e2e_console_module() {
    let result = run(&[
        "--host-modules",
        "-e",
        "var console = require('host/console'); console.log('logged', 1); typeof console.error",
    ])
    .unwrap();
    assert_eq!(result, Value::from("function"));
}

#[test]
fn test_e2e_exit_codes() {
    let guest = run(&["-e", "null.field"]).unwrap_err();
    assert_eq!(guest.exit_code(), 1);

    let missing = run(&["-e", "require('no/such/module')"]).unwrap_err();
    assert!(matches!(
        &missing,
        CliError::Bridge(BridgeError::ModuleNotFound { .. })
    ));
    assert_eq!(missing.exit_code(), 2);

    let unreadable = run(&["-f", "/no/such/dir/main.js"]).unwrap_err();
    assert_eq!(unreadable.exit_code(), 3);
}

#[test]
fn test_e2e_env_snapshot() {
    let result = run(&["-e", "Object.isFrozen(process.env)"]).unwrap();
    assert_eq!(result, Value::from(true));

    let empty = run(&["--no-env", "-e", "JSON.stringify(process.env)"]).unwrap();
    assert_eq!(empty, Value::from("{}"));
}
