//! Section/option storage
//!
//! A `Store` maps section names to ordered option maps. The default
//! section always exists and is the fallback scope for every lookup.
//! Names are case-sensitive.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};

/// Name of the fallback section
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Options of a single section, in insertion order
pub type Section = IndexMap<String, String>;

/// Raw (unresolved) section/option storage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Store {
    sections: IndexMap<String, Section>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store holding only an empty default section
    pub fn new() -> Self {
        let mut sections = IndexMap::new();
        sections.insert(DEFAULT_SECTION.to_string(), Section::new());
        Self { sections }
    }

    /// Add a section. Returns false if it already existed.
    pub fn add_section(&mut self, section: &str) -> bool {
        if self.sections.contains_key(section) {
            return false;
        }
        self.sections.insert(section.to_string(), Section::new());
        true
    }

    /// Remove a section and its options.
    ///
    /// The default section cannot be removed; it is emptied instead.
    pub fn remove_section(&mut self, section: &str) -> bool {
        if section == DEFAULT_SECTION {
            let had_options = !self.default_section().is_empty();
            if let Some(default) = self.sections.get_mut(DEFAULT_SECTION) {
                default.clear();
            }
            return had_options;
        }
        self.sections.shift_remove(section).is_some()
    }

    /// Check if a section exists
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names in insertion order, default section first
    pub fn sections(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// Set an option, creating the section if needed.
    ///
    /// Returns false when an existing value was overwritten.
    pub fn add_option(
        &mut self,
        section: &str,
        option: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.into(), value.into())
            .is_none()
    }

    /// Remove an option from a section. Returns false if it was absent.
    pub fn remove_option(&mut self, section: &str, option: &str) -> bool {
        self.sections
            .get_mut(section)
            .and_then(|s| s.shift_remove(option))
            .is_some()
    }

    /// Check if an option is visible from a section (default fallback included)
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.get(section, option).is_some()
    }

    /// Options visible from a section: its own, then unshadowed defaults
    pub fn options(&self, section: &str) -> Result<Vec<&str>> {
        let own = self
            .sections
            .get(section)
            .ok_or_else(|| Error::section_not_found(section))?;

        let mut names: Vec<&str> = own.keys().map(String::as_str).collect();
        if section != DEFAULT_SECTION {
            names.extend(
                self.default_section()
                    .keys()
                    .filter(|k| !own.contains_key(k.as_str()))
                    .map(String::as_str),
            );
        }
        Ok(names)
    }

    /// Options stored directly in a section, without fallback
    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(section)
    }

    /// Look up a raw value in `section`, falling back to the default section
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(option))
            .or_else(|| self.default_section().get(option))
            .map(String::as_str)
    }

    /// Look up a raw value in the default section only
    pub fn get_default(&self, option: &str) -> Option<&str> {
        self.default_section().get(option).map(String::as_str)
    }

    /// Merge another store into this one; its options win
    pub fn merge(&mut self, other: Store) {
        for (name, options) in other.sections {
            let target = self.sections.entry(name).or_default();
            for (option, value) in options {
                target.insert(option, value);
            }
        }
    }

    fn default_section(&self) -> &Section {
        // Both constructors seed the default section and removal only clears it
        static EMPTY: std::sync::LazyLock<Section> = std::sync::LazyLock::new(Section::new);
        self.sections.get(DEFAULT_SECTION).unwrap_or(&*EMPTY)
    }
}
