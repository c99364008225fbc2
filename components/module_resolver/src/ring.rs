//! Search rings: ordered candidate directories for one resolution step.

use std::path::{Path, PathBuf};

/// Directory name searched next to resolved files
pub const NODE_MODULES: &str = "node_modules";

/// Ordered list of directories consulted for one segment; first match wins.
///
/// Rings are values: [`SearchRing::descend`] returns a new ring and never
/// mutates the one it was called on, so the configured roots are never
/// changed by a resolution.
///
/// # Examples
///
/// ```
/// use module_resolver::SearchRing;
/// use std::path::{Path, PathBuf};
///
/// let roots = SearchRing::new(["/srv/js"]);
/// let next = roots.descend(Path::new("/srv/js/lib/foo.js"));
/// assert_eq!(
///     next.dirs(),
///     &[
///         PathBuf::from("/srv/js/lib"),
///         PathBuf::from("/srv/js/lib/node_modules"),
///         PathBuf::from("/srv/js/node_modules"),
///         PathBuf::from("/srv/js"),
///     ]
/// );
/// assert_eq!(roots.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRing {
    dirs: Vec<PathBuf>,
}

impl SearchRing {
    /// Creates a ring from directories in priority order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the directories in priority order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Number of directories.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    /// Returns true if the ring has no directories.
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Returns the ring used after `matched` resolved a segment.
    ///
    /// The matched file's directory, its `node_modules` and the parent's
    /// `node_modules` are prepended to this ring.
    pub fn descend(&self, matched: &Path) -> SearchRing {
        let dir = matched.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut dirs = Vec::with_capacity(self.dirs.len() + 3);
        dirs.push(dir.clone());
        dirs.push(dir.join(NODE_MODULES));
        if let Some(parent) = dir.parent() {
            dirs.push(parent.join(NODE_MODULES));
        }
        dirs.extend(self.dirs.iter().cloned());

        SearchRing { dirs }
    }

    /// Returns a ring holding only the highest-priority directory.
    pub fn head(&self) -> SearchRing {
        SearchRing {
            dirs: self.dirs.iter().take(1).cloned().collect(),
        }
    }
}
