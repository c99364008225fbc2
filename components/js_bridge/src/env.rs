//! Environment snapshots exposed to the guest as `process.env`.

use core_types::Value;
use indexmap::IndexMap;

/// An immutable copy of environment variables taken at one point in time.
///
/// Changes to the process environment after the snapshot is taken are
/// never visible through it.
///
/// # Examples
///
/// ```
/// use js_bridge::EnvSnapshot;
///
/// let env: EnvSnapshot = [("HOME", "/home/guest")].into_iter().collect();
/// assert_eq!(env.get("HOME"), Some("/home/guest"));
/// assert_eq!(env.get("PATH"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: IndexMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up one variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if the snapshot holds no variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The snapshot as an object of strings.
    pub fn to_value(&self) -> Value {
        Value::object(self.iter())
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
