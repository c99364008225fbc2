//! Module resolution for guest `require` calls.
//!
//! This crate decides *which* source a `require(id)` call loads. It never
//! runs JavaScript: it answers with either source text read from disk or
//! the public surface of a registered host module.
//!
//! # Overview
//!
//! - [`ModuleResolver`] - Resolution policy over configured search roots
//! - [`ModuleId`] - Module ids with `!`-separated plugin-chain segments
//! - [`SearchRing`] - Ordered candidate directories for one resolution step
//! - [`HostModuleRegistry`] / [`HostModule`] - Host modules reachable under a prefix
//! - [`FsLookup`] - Filesystem queries (`is_file`, `read_text`, `package.json` main)
//!
//! # Resolution
//!
//! Each segment of a module id is looked up in every directory of the
//! current ring. A directory with a `package.json` resolves through its
//! `main` entry; otherwise `<segment>.js` is tried. Once a segment
//! matches, the next ring starts with the matching file's directory and
//! the nearby `node_modules` directories, followed by the previous ring.
//!
//! # Examples
//!
//! ```no_run
//! use module_resolver::{ModuleResolver, ResolvedModule};
//!
//! let resolver = ModuleResolver::new(["./js", "./vendor"]);
//! match resolver.resolve("lodash!./fp").unwrap() {
//!     ResolvedModule::Source(module) => println!("{}", module.path.display()),
//!     ResolvedModule::Host(host) => println!("host module {}", host.name),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod host;
pub mod id;
pub mod lookup;
pub mod resolver;
pub mod ring;

pub use host::{HostModule, HostModuleRegistry};
pub use id::ModuleId;
pub use lookup::FsLookup;
pub use resolver::{
    HostExports, Located, ModuleResolver, ResolvedModule, SourceModule, DEFAULT_HOST_PREFIX,
};
pub use ring::SearchRing;
