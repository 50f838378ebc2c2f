//! Lookup strategies for reference unfolding
//!
//! A [`Lookup`] maps a reference name to its replacement. An empty
//! replacement means "not found": a value that is legitimately empty
//! cannot be substituted.

use std::collections::HashMap;

use crate::store::Store;

/// Trait for reference lookup strategies
pub trait Lookup {
    /// Replacement for `name`, or an empty string if there is none
    fn lookup(&self, name: &str) -> String;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> String,
{
    fn lookup(&self, name: &str) -> String {
        self(name)
    }
}

/// Resolves `%(name)s` against one section, then the default section.
///
/// Returned values are raw: references inside them are unfolded by the
/// next splice step, not here.
pub struct SectionLookup<'a> {
    store: &'a Store,
    section: &'a str,
}

impl<'a> SectionLookup<'a> {
    pub fn new(store: &'a Store, section: &'a str) -> Self {
        Self { store, section }
    }
}

impl Lookup for SectionLookup<'_> {
    fn lookup(&self, name: &str) -> String {
        self.store
            .get(self.section, name)
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Source of environment variables
pub trait Environment: Send + Sync {
    /// Value of `name`, or an empty string when unset
    fn var(&self, name: &str) -> String;
}

/// The host process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> String {
        std::env::var(name).unwrap_or_default()
    }
}

/// A fixed in-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> String {
        self.vars.get(name).cloned().unwrap_or_default()
    }
}

/// Resolves `${name}` through an [`Environment`]
pub struct EnvLookup<'a> {
    env: &'a dyn Environment,
}

impl<'a> EnvLookup<'a> {
    pub fn new(env: &'a dyn Environment) -> Self {
        Self { env }
    }
}

impl Lookup for EnvLookup<'_> {
    fn lookup(&self, name: &str) -> String {
        self.env.var(name)
    }
}
