//! The module resolution policy.
//!
//! [`ModuleResolver::resolve`] answers one `require(id)` call. It holds
//! only configuration (roots, host registry, prefix); ring state lives on
//! the stack of a single call and nothing is cached between calls.

use crate::host::HostModuleRegistry;
use crate::id::{is_relative, ModuleId};
use crate::lookup::{normalize, FsLookup};
use crate::ring::SearchRing;
use core_types::{BridgeError, BridgeResult, Value};
use log::{debug, trace, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefix that routes a request to the host module registry
pub const DEFAULT_HOST_PREFIX: &str = "host/";

/// Separator used in host module names (`host/text/case` → `text::case`)
const HOST_PATH_SEPARATOR: &str = "::";

/// Parameter list of the CommonJS function wrapper
const WRAPPER_PARAMS: &str = "require, exports, module, __filename, __dirname";

/// A module found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    /// Full chained id the module was resolved under
    pub id: ModuleId,
    /// Normalized path of the matched file
    pub path: PathBuf,
    /// File contents
    pub source: String,
}

impl SourceModule {
    /// Directory containing the module file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Returns the source wrapped in a CommonJS function expression.
    ///
    /// The expression evaluates to a function taking
    /// `(require, exports, module, __filename, __dirname)`. A leading `#!`
    /// line is commented out and `.json` files assign their content to
    /// `module.exports`. Line numbers inside the body are shifted by one.
    pub fn wrapped(&self) -> String {
        let body = if self.is_json() {
            format!("module.exports = {};", self.source.trim())
        } else if let Some(rest) = self.source.strip_prefix("#!") {
            format!("//{}", rest)
        } else {
            self.source.clone()
        };
        format!("(function ({}) {{\n{}\n}})", WRAPPER_PARAMS, body)
    }

    fn is_json(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "json")
    }
}

/// A host module's public surface, ready to be copied into `exports`.
#[derive(Debug, Clone, PartialEq)]
pub struct HostExports {
    /// Host module name (`::`-separated)
    pub name: String,
    /// Exported attributes in export order
    pub exports: Vec<(String, Value)>,
}

/// Result of resolving one module id.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedModule {
    /// Source text read from disk
    Source(SourceModule),
    /// A host module satisfied the request; there is no source
    Host(HostExports),
}

/// Where the last segment of an id matched, and the ring that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Normalized path of the matched file
    pub path: PathBuf,
    /// Ring for anything resolved after this file
    pub ring: SearchRing,
}

/// Resolves module ids against search roots and host modules.
///
/// # Examples
///
/// ```no_run
/// use module_resolver::{HostModule, HostModuleRegistry, ModuleResolver};
///
/// let mut registry = HostModuleRegistry::new();
/// registry.register("text", HostModule::new().attribute("version", "1.0"));
///
/// let resolver = ModuleResolver::new(["./js"]).with_host_modules(registry);
/// assert!(resolver.is_host_request("host/text"));
/// ```
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    roots: Vec<PathBuf>,
    host_modules: HostModuleRegistry,
    host_bridging: bool,
    host_prefix: String,
    fs: FsLookup,
}

impl ModuleResolver {
    /// Creates a resolver over `roots`, in priority order, with host
    /// bridging disabled.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            host_modules: HostModuleRegistry::new(),
            host_bridging: false,
            host_prefix: DEFAULT_HOST_PREFIX.to_string(),
            fs: FsLookup,
        }
    }

    /// Installs a host module registry and enables host bridging.
    pub fn with_host_modules(mut self, registry: HostModuleRegistry) -> Self {
        self.host_modules = registry;
        self.host_bridging = true;
        self
    }

    /// Enables or disables host bridging.
    pub fn with_host_bridging(mut self, enabled: bool) -> Self {
        self.host_bridging = enabled;
        self
    }

    /// Changes the prefix that routes requests to host modules.
    pub fn with_host_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.host_prefix = prefix.into();
        self
    }

    /// Configured search roots, in priority order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether `host/...` requests consult the registry.
    pub fn host_bridging(&self) -> bool {
        self.host_bridging
    }

    /// The host module prefix.
    pub fn host_prefix(&self) -> &str {
        &self.host_prefix
    }

    /// The host module registry.
    pub fn host_modules(&self) -> &HostModuleRegistry {
        &self.host_modules
    }

    /// Returns true if `id` would first be tried as a host module.
    pub fn is_host_request(&self, id: &str) -> bool {
        self.host_bridging && id.starts_with(&self.host_prefix)
    }

    /// Computes the id for `require(requested)` issued by the module
    /// resolved as `parent` (`None` for top-level code).
    ///
    /// Requests from inside a module are chained onto the module's own id;
    /// host requests are never chained.
    pub fn effective_id(&self, parent: Option<&ModuleId>, requested: &str) -> String {
        match parent {
            Some(parent) if !self.is_host_request(requested) => parent.chain(requested),
            _ => requested.to_string(),
        }
    }

    /// Resolves `id` and loads the module.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidModuleId`] for empty ids or segments
    /// - [`BridgeError::ModuleNotFound`] when some segment matches nowhere
    /// - [`BridgeError::PackageDescriptor`] when some segment matches nowhere
    ///   and a malformed `package.json` was skipped on the way
    /// - [`BridgeError::MissingExport`] for a host module with a bad export list
    /// - [`BridgeError::Io`] if the matched file cannot be read
    pub fn resolve(&self, id: &str) -> BridgeResult<ResolvedModule> {
        if let Some(host) = self.import_host(id)? {
            debug!("resolved '{}' to host module {}", id, host.name);
            return Ok(ResolvedModule::Host(host));
        }

        let module_id = ModuleId::parse(id)?;
        let located = self.locate(&module_id)?;
        let source = self.fs.read_text(&located.path)?;
        debug!("resolved '{}' to {}", id, located.path.display());

        Ok(ResolvedModule::Source(SourceModule {
            id: module_id,
            path: located.path,
            source,
        }))
    }

    /// Finds the file for the last segment of `id` without reading it.
    pub fn locate(&self, id: &ModuleId) -> BridgeResult<Located> {
        let ring = SearchRing::new(self.roots.iter().cloned());
        self.resolve_segments(id, &id.segments(), ring, 0)
    }

    fn resolve_segments(
        &self,
        id: &ModuleId,
        segments: &[&str],
        ring: SearchRing,
        depth: usize,
    ) -> BridgeResult<Located> {
        let Some((segment, rest)) = segments.split_first() else {
            return Err(BridgeError::InvalidModuleId {
                id: id.to_string(),
                reason: "no segments".to_string(),
            });
        };

        // A relative segment in a chain only looks next to the previous file.
        let candidates = if depth > 0 && is_relative(segment) {
            ring.head()
        } else {
            ring.clone()
        };

        let path = self.locate_segment(id, segment, &candidates)?;
        let next = ring.descend(&path);

        if rest.is_empty() {
            Ok(Located { path, ring: next })
        } else {
            self.resolve_segments(id, rest, next, depth + 1)
        }
    }

    fn locate_segment(
        &self,
        id: &ModuleId,
        segment: &str,
        ring: &SearchRing,
    ) -> BridgeResult<PathBuf> {
        let mut broken_descriptor = None;
        for dir in ring.dirs() {
            let base = dir.join(segment);
            trace!("probing {} for '{}'", base.display(), segment);
            if let Some(found) = self.try_candidate(&base, &mut broken_descriptor) {
                return Ok(normalize(&found));
            }
        }

        debug!(
            "segment '{}' of '{}' not found in {} directories",
            segment,
            id,
            ring.len()
        );
        Err(broken_descriptor.unwrap_or_else(|| BridgeError::ModuleNotFound {
            id: id.to_string(),
        }))
    }

    /// Checks one `dir/segment` candidate, in priority order:
    /// package directory, `segment.js`, the file itself, `segment/index.js`.
    ///
    /// An unusable `package.json` only rules out the package entry; the
    /// first such failure is kept in `broken_descriptor`.
    fn try_candidate(
        &self,
        base: &Path,
        broken_descriptor: &mut Option<BridgeError>,
    ) -> Option<PathBuf> {
        if self.fs.is_dir(base) {
            match self.fs.package_main(base) {
                Ok(Some(main)) => {
                    if let Some(entry) = self.entry_point(&base.join(main)) {
                        return Some(entry);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("ignoring package in {}: {}", base.display(), err);
                    broken_descriptor.get_or_insert(err);
                }
            }
        }

        let with_js = with_suffix(base, ".js");
        if self.fs.is_file(&with_js) {
            return Some(with_js);
        }

        let loadable = base
            .extension()
            .is_some_and(|ext| ext == "js" || ext == "json");
        if loadable && self.fs.is_file(base) {
            return Some(base.to_path_buf());
        }

        let index = base.join(crate::lookup::DEFAULT_MAIN);
        if self.fs.is_file(&index) {
            return Some(index);
        }

        None
    }

    /// Resolves a package `main` the way Node does: as a file, with `.js`
    /// appended, or as a directory with `index.js`.
    fn entry_point(&self, main: &Path) -> Option<PathBuf> {
        [
            main.to_path_buf(),
            with_suffix(main, ".js"),
            main.join(crate::lookup::DEFAULT_MAIN),
        ]
        .into_iter()
        .find(|candidate| self.fs.is_file(candidate))
    }

    fn import_host(&self, id: &str) -> BridgeResult<Option<HostExports>> {
        if !self.is_host_request(id) {
            return Ok(None);
        }

        let name = id[self.host_prefix.len()..].replace('/', HOST_PATH_SEPARATOR);
        match self.host_modules.import(&name) {
            Ok(module) => Ok(Some(HostExports {
                exports: module.public_exports(&name)?,
                name,
            })),
            Err(err) => {
                warn!(
                    "host module '{}' unavailable ({}), trying search roots",
                    name, err
                );
                Ok(None)
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}
