//! Host modules and globals the CLI installs for scripts
//!
//! - `print(...)` global
//! - `host/console` with `log` and `error`
//! - `host/path` with `join`, `dirname`, `basename` and `extname`

use core_types::{BridgeError, BridgeResult, HostFunction, Value};
use module_resolver::lookup::normalize;
use module_resolver::{HostModule, HostModuleRegistry};
use std::path::{Path, PathBuf};

/// The registry of built-in host modules.
pub fn host_modules() -> HostModuleRegistry {
    let mut registry = HostModuleRegistry::new();
    registry.register("console", console_module());
    registry.register("path", path_module());
    registry
}

/// `print(...args)`: writes the arguments to stdout, space separated.
pub fn print_function() -> HostFunction {
    HostFunction::from_fn(|args| {
        println!("{}", render_args(args));
        Ok(Value::Null)
    })
}

/// Formats arguments the way `console.log` does.
pub fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn console_module() -> HostModule {
    HostModule::new()
        .function("log", |_scope, args| {
            println!("{}", render_args(args));
            Ok(Value::Null)
        })
        .function("error", |_scope, args| {
            eprintln!("{}", render_args(args));
            Ok(Value::Null)
        })
}

fn path_module() -> HostModule {
    HostModule::new()
        .attribute("sep", "/")
        .function("join", |_scope, args| {
            let parts = string_args("join", args)?;
            Ok(Value::from(join(&parts)))
        })
        .function("dirname", |_scope, args| {
            let path = first_string("dirname", args)?;
            Ok(Value::from(dirname(path)))
        })
        .function("basename", |_scope, args| {
            let path = first_string("basename", args)?;
            let suffix = args.get(1).and_then(Value::as_str);
            Ok(Value::from(basename(path, suffix)))
        })
        .function("extname", |_scope, args| {
            let path = first_string("extname", args)?;
            Ok(Value::from(extname(path)))
        })
}

fn string_args<'a>(function: &str, args: &'a [Value]) -> BridgeResult<Vec<&'a str>> {
    args.iter()
        .map(|arg| {
            arg.as_str().ok_or_else(|| {
                BridgeError::TypeError(format!(
                    "path.{} expects string arguments, got {}",
                    function,
                    arg.type_of()
                ))
            })
        })
        .collect()
}

fn first_string<'a>(function: &str, args: &'a [Value]) -> BridgeResult<&'a str> {
    match args.first() {
        Some(arg) => string_args(function, std::slice::from_ref(arg)).map(|parts| parts[0]),
        None => Err(BridgeError::TypeError(format!(
            "path.{} expects a path argument",
            function
        ))),
    }
}

/// Joins non-empty segments with `/` and normalizes the result.
pub fn join(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return ".".to_string();
    }

    let normalized = normalize(Path::new(&joined));
    let text = normalized.to_string_lossy().into_owned();
    if text.is_empty() {
        ".".to_string()
    } else {
        text
    }
}

/// Directory part of `path`; `.` when there is none.
pub fn dirname(path: &str) -> String {
    match Path::new(path).parent() {
        Some(parent) if parent.as_os_str().is_empty() => ".".to_string(),
        Some(parent) => parent.to_string_lossy().into_owned(),
        None if path.starts_with('/') => "/".to_string(),
        None => ".".to_string(),
    }
}

/// Last component of `path`, without `suffix` when it ends with it.
pub fn basename(path: &str, suffix: Option<&str>) -> String {
    let name = PathBuf::from(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match suffix {
        Some(suffix) if name != suffix => name
            .strip_suffix(suffix)
            .map(str::to_string)
            .unwrap_or(name),
        _ => name,
    }
}

/// Extension of `path` including the dot, or an empty string.
pub fn extname(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
