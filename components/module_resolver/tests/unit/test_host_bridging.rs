//! Host module bridging through the `host/` prefix

use super::write;
use core_types::{BridgeError, Value};
use module_resolver::{HostModule, HostModuleRegistry, ModuleResolver, ResolvedModule};
use tempfile::TempDir;

fn registry() -> HostModuleRegistry {
    let mut registry = HostModuleRegistry::new();
    registry.register(
        "text",
        HostModule::new()
            .attribute("version", "1.0")
            .attribute("_secret", 1),
    );
    registry.register("text::case", HostModule::new().attribute("mode", "upper"));
    registry.register_lazy("broken", || Err(BridgeError::host("backend offline")));
    registry.register("bad_exports", HostModule::new().with_exports(["ghost"]));
    registry
}

#[test]
fn test_host_module_exports() {
    let resolver = ModuleResolver::new(Vec::<std::path::PathBuf>::new()).with_host_modules(registry());

    match resolver.resolve("host/text").unwrap() {
        ResolvedModule::Host(host) => {
            assert_eq!(host.name, "text");
            assert_eq!(host.exports, vec![("version".to_string(), Value::from("1.0"))]);
        }
        other => panic!("expected host module, got {:?}", other),
    }
}

#[test]
fn test_slashes_become_path_separators() {
    let resolver = ModuleResolver::new(Vec::<std::path::PathBuf>::new()).with_host_modules(registry());

    match resolver.resolve("host/text/case").unwrap() {
        ResolvedModule::Host(host) => assert_eq!(host.name, "text::case"),
        other => panic!("expected host module, got {:?}", other),
    }
}

#[test]
fn test_failed_import_falls_through_to_roots() {
    let root = TempDir::new().unwrap();
    write(root.path(), "host/broken.js", "// shim");

    let resolver = ModuleResolver::new([root.path()]).with_host_modules(registry());
    match resolver.resolve("host/broken").unwrap() {
        ResolvedModule::Source(module) => {
            assert_eq!(module.path, root.path().join("host/broken.js"))
        }
        other => panic!("expected source module, got {:?}", other),
    }
}

#[test]
fn test_unregistered_and_absent_is_not_found() {
    let root = TempDir::new().unwrap();
    let resolver = ModuleResolver::new([root.path()]).with_host_modules(registry());

    assert!(matches!(
        resolver.resolve("host/nothing"),
        Err(BridgeError::ModuleNotFound { id }) if id == "host/nothing"
    ));
}

#[test]
fn test_bad_export_list_is_an_error() {
    let resolver = ModuleResolver::new(Vec::<std::path::PathBuf>::new()).with_host_modules(registry());
    assert!(matches!(
        resolver.resolve("host/bad_exports"),
        Err(BridgeError::MissingExport { module, name }) if module == "bad_exports" && name == "ghost"
    ));
}

#[test]
fn test_disabled_bridging_uses_filesystem() {
    let root = TempDir::new().unwrap();
    write(root.path(), "host/text.js", "// file");

    let resolver = ModuleResolver::new([root.path()])
        .with_host_modules(registry())
        .with_host_bridging(false);

    assert!(!resolver.is_host_request("host/text"));
    assert!(matches!(
        resolver.resolve("host/text").unwrap(),
        ResolvedModule::Source(_)
    ));
}
