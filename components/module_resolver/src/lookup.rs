//! Filesystem queries used during resolution.

use core_types::{BridgeError, BridgeResult};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// File name of a package descriptor
pub const PACKAGE_DESCRIPTOR: &str = "package.json";

/// Entry point used when a descriptor has no `main`
pub const DEFAULT_MAIN: &str = "index.js";

#[derive(Debug, Deserialize)]
struct PackageDescriptor {
    #[serde(default)]
    main: Option<String>,
}

/// Stateless filesystem lookups.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLookup;

impl FsLookup {
    /// Returns true if `path` is an existing regular file.
    pub fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Returns true if `path` is an existing directory.
    pub fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Reads `path` as UTF-8 text.
    pub fn read_text(&self, path: &Path) -> BridgeResult<String> {
        fs::read_to_string(path).map_err(|source| BridgeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the `main` entry of `dir/package.json`.
    ///
    /// Returns `Ok(None)` when the directory has no descriptor and
    /// [`DEFAULT_MAIN`] when the descriptor omits `main`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PackageDescriptor`] if the descriptor is not
    /// valid JSON or `main` is not a string.
    pub fn package_main(&self, dir: &Path) -> BridgeResult<Option<String>> {
        let path = dir.join(PACKAGE_DESCRIPTOR);
        if !self.is_file(&path) {
            return Ok(None);
        }

        let text = self.read_text(&path)?;
        let descriptor: PackageDescriptor =
            serde_json::from_str(&text).map_err(|e| BridgeError::PackageDescriptor {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let main = descriptor
            .main
            .filter(|main| !main.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MAIN.to_string());
        Ok(Some(main))
    }
}

/// Lexically normalizes a path, removing `.` and folding `..`.
///
/// Does not touch the filesystem, so symlinks are not resolved.
///
/// ```
/// use module_resolver::lookup::normalize;
/// use std::path::PathBuf;
///
/// assert_eq!(normalize("a/./b/../c.js".as_ref()), PathBuf::from("a/c.js"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
