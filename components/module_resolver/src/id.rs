//! Module ids and plugin-chain segments.
//!
//! A module id such as `"loader!./template"` is a chain of segments
//! separated by `!`. Segments are resolved left to right; each one after
//! the first is looked up near the file that matched the one before it.

use core_types::{BridgeError, BridgeResult};
use std::fmt;
use std::str::FromStr;

/// Separator between plugin-chain segments
pub const CHAIN_SEPARATOR: char = '!';

/// A validated module id.
///
/// # Examples
///
/// ```
/// use module_resolver::ModuleId;
///
/// let id = ModuleId::parse("lib/foo!./sibling").unwrap();
/// assert_eq!(id.segments(), vec!["lib/foo", "./sibling"]);
/// assert!(ModuleId::parse("a!!b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    /// Validates `id`: it must be non-empty and contain no empty segment.
    pub fn parse(id: &str) -> BridgeResult<Self> {
        if id.is_empty() {
            return Err(invalid(id, "module id is empty"));
        }
        if id.split(CHAIN_SEPARATOR).any(|segment| segment.is_empty()) {
            return Err(invalid(id, "empty plugin-chain segment"));
        }
        Ok(ModuleId(id.to_string()))
    }

    /// Returns the segments in resolution order.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split(CHAIN_SEPARATOR).collect()
    }

    /// Returns the final segment, the one naming the loaded file.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit(CHAIN_SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Returns the id for a `require(requested)` issued from this module.
    ///
    /// The request becomes a new segment at the end of this module's
    /// chain, so it is resolved near this module's file.
    ///
    /// ```
    /// use module_resolver::ModuleId;
    ///
    /// let parent = ModuleId::parse("lib/foo").unwrap();
    /// assert_eq!(parent.chain("./sibling"), "lib/foo!./sibling");
    /// ```
    pub fn chain(&self, requested: &str) -> String {
        format!("{}{}{}", self.0, CHAIN_SEPARATOR, requested)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModuleId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleId::parse(s)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true for segments that start with `./` or `../` (or are `.`/`..`).
pub fn is_relative(segment: &str) -> bool {
    segment == "."
        || segment == ".."
        || segment.starts_with("./")
        || segment.starts_with("../")
}

fn invalid(id: &str, reason: &str) -> BridgeError {
    BridgeError::InvalidModuleId {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
