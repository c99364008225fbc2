//! Bridge configuration loaded from JSON.

use core_types::{BridgeError, BridgeResult};
use module_resolver::{HostModuleRegistry, ModuleResolver, DEFAULT_HOST_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for building a [`crate::Context`].
///
/// Every field is optional in the JSON form:
///
/// ```json
/// {
///   "search_paths": ["lib", "/usr/share/js"],
///   "enable_require": true,
///   "enable_host_modules": false,
///   "host_prefix": "host/",
///   "snapshot_env": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Module search roots, in priority order
    pub search_paths: Vec<PathBuf>,
    /// Install the global `require` function
    pub enable_require: bool,
    /// Let `host/...` requests reach registered host modules
    pub enable_host_modules: bool,
    /// Prefix that routes a request to host modules
    pub host_prefix: String,
    /// Expose the process environment as `process.env`
    pub snapshot_env: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            enable_require: true,
            enable_host_modules: false,
            host_prefix: DEFAULT_HOST_PREFIX.to_string(),
            snapshot_env: true,
        }
    }
}

impl BridgeConfig {
    /// Loads a configuration file.
    ///
    /// Relative search paths are taken relative to the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        let mut config = Self::from_json_str(&text)?;
        if let Some(base) = path.parent() {
            config.search_paths = config
                .search_paths
                .into_iter()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
                .collect();
        }
        Ok(config)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> BridgeResult<Self> {
        serde_json::from_str(text).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Builds the resolver described by this configuration, or `None` when
    /// `require` is disabled.
    pub fn resolver(&self, registry: HostModuleRegistry) -> Option<ModuleResolver> {
        self.enable_require.then(|| {
            ModuleResolver::new(self.search_paths.iter().cloned())
                .with_host_modules(registry)
                .with_host_bridging(self.enable_host_modules)
                .with_host_prefix(self.host_prefix.clone())
        })
    }
}
