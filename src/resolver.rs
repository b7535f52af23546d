//! Variable sources used by the expander.

use std::collections::HashMap;

/// An object used to resolve and store variables.
///
/// `get` returns an empty string for unset variables, so "unset" and
/// "set to empty" look the same to the expander.
pub trait Resolver {
    /// Value of a variable, or `""` when unset.
    fn get(&self, key: &str) -> String;

    /// Stores a value and returns it.
    fn set(&mut self, key: &str, value: &str) -> String;

    /// Drops every stored value. A no-op unless the resolver supports it.
    fn reset(&mut self) {}
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> String {
        (**self).set(key, value)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn get(&self, key: &str) -> String {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> String {
        (**self).set(key, value)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Resolves from the process environment, with local overrides.
///
/// `set` only records an override; the real environment is never
/// modified.
#[derive(Debug, Clone, Default)]
pub struct EnvResolver {
    overrides: HashMap<String, String>,
}

impl EnvResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolver for EnvResolver {
    fn get(&self, key: &str) -> String {
        self.overrides
            .get(key)
            .cloned()
            .unwrap_or_else(|| std::env::var(key).unwrap_or_default())
    }

    fn set(&mut self, key: &str, value: &str) -> String {
        self.overrides.insert(key.to_string(), value.to_string());
        value.to_string()
    }

    fn reset(&mut self) {
        self.overrides.clear();
    }
}

/// In-memory resolver with no environment fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResolver {
    vars: HashMap<String, String>,
}

impl MapResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Whether a variable has been stored, even if empty.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Resolver for MapResolver {
    fn get(&self, key: &str) -> String {
        self.vars.get(key).cloned().unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) -> String {
        self.vars.insert(key.to_string(), value.to_string());
        value.to_string()
    }

    fn reset(&mut self) {
        self.vars.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
