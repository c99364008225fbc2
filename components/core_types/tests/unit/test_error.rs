//! Unit tests for BridgeError and ErrorKind

use core_types::{BridgeError, ErrorKind};
use std::path::PathBuf;

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_resolution_errors() {
        let errors = [
            BridgeError::ModuleNotFound {
                id: "x".to_string(),
            },
            BridgeError::InvalidModuleId {
                id: "a!!b".to_string(),
                reason: "empty segment".to_string(),
            },
            BridgeError::PackageDescriptor {
                path: PathBuf::from("pkg/package.json"),
                message: "expected value".to_string(),
            },
            BridgeError::MissingExport {
                module: "text".to_string(),
                name: "upper".to_string(),
            },
        ];
        for error in &errors {
            assert_eq!(error.kind(), ErrorKind::Resolution, "{}", error);
        }
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(BridgeError::TypeError("x".into()).kind(), ErrorKind::Type);
        assert_eq!(
            BridgeError::Invocation {
                message: "Error: x".into()
            }
            .kind(),
            ErrorKind::Invocation
        );
        assert_eq!(
            BridgeError::HostCallable {
                name: "f".into(),
                message: "x".into()
            }
            .kind(),
            ErrorKind::HostCallable
        );
    }

    #[test]
    fn test_coercion_and_config() {
        assert_eq!(BridgeError::coercion("cycle").kind(), ErrorKind::Coercion);
        assert_eq!(BridgeError::Config("bad".into()).kind(), ErrorKind::Config);
        assert_eq!(BridgeError::host("bad").kind(), ErrorKind::Runtime);
    }
}

#[cfg(test)]
mod error_message_tests {
    use super::*;

    #[test]
    fn test_type_error_restores_prefix() {
        let error = BridgeError::TypeError("foo is not a function".to_string());
        assert_eq!(error.to_string(), "TypeError: foo is not a function");
    }

    #[test]
    fn test_host_callable_message() {
        let error = BridgeError::HostCallable {
            name: "fetch".to_string(),
            message: "offline".to_string(),
        };
        assert_eq!(error.to_string(), "host function 'fetch' failed: offline");
    }

    #[test]
    fn test_package_descriptor_mentions_path() {
        let error = BridgeError::PackageDescriptor {
            path: PathBuf::from("pkg/package.json"),
            message: "EOF while parsing".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("pkg/package.json"));
        assert!(text.contains("EOF while parsing"));
    }

    #[test]
    fn test_coercion_message() {
        let error = BridgeError::coercion("cyclic object value");
        assert_eq!(error.to_string(), "cannot coerce value: cyclic object value");
    }
}
