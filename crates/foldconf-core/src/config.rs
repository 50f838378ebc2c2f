//! Main Config type for foldconf
//!
//! The Config type is the primary interface for reading option values.
//! Every string access unfolds `%(name)s` variables first, then
//! `${name}` environment references on the result.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::bind::{self, Target};
use crate::error::{Error, Result};
use crate::interpolation::{self, Reference, DEFAULT_MAX_DEPTH};
use crate::ini;
use crate::resolver::{EnvLookup, Environment, ProcessEnv, SectionLookup};
use crate::store::Store;

/// Recognized boolean tokens, matched after lowercasing
pub const BOOL_TOKENS: &[(&str, bool)] = &[
    ("1", true),
    ("t", true),
    ("true", true),
    ("y", true),
    ("yes", true),
    ("on", true),
    ("0", false),
    ("f", false),
    ("false", false),
    ("n", false),
    ("no", false),
    ("off", false),
];

/// Parse a boolean token (case-insensitive)
pub fn parse_bool(value: &str) -> Option<bool> {
    let lower = value.to_lowercase();
    BOOL_TOKENS
        .iter()
        .find(|(token, _)| *token == lower)
        .map(|(_, b)| *b)
}

/// Configuration options for reading values
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    /// Maximum splice steps per unfolding pass
    pub max_depth: usize,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The main configuration container
pub struct Config {
    /// The raw (unresolved) section/option data
    store: Store,
    /// Environment consulted for `${name}` references
    env: Arc<dyn Environment>,
    /// Configuration options
    options: ConfigOptions,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("store", &self.store)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create a new Config over a populated store
    pub fn new(store: Store) -> Self {
        Self::with_options(store, ConfigOptions::default())
    }

    /// Create a Config with custom options
    pub fn with_options(store: Store, options: ConfigOptions) -> Self {
        Self {
            store,
            env: Arc::new(ProcessEnv),
            options,
        }
    }

    /// Replace the environment used for `${name}` references
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Load configuration from an INI string
    pub fn from_ini(text: &str) -> Result<Self> {
        Ok(Self::new(Store::from_ini(text)?))
    }

    /// Load configuration from an INI file
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(read_store(path.as_ref())?))
    }

    /// Load and merge multiple INI files
    ///
    /// Files are merged in order, with later files overriding earlier
    /// ones option by option.
    pub fn load_merged<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut store = Store::new();
        for path in paths {
            store.merge(read_store(path.as_ref())?);
        }
        Ok(Self::new(store))
    }

    /// The raw store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the raw store
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The options this config reads with
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Get the raw value, falling back to the default section.
    ///
    /// The value is not unfolded.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<String> {
        self.store
            .get(section, option)
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(section, option))
    }

    /// Get the raw value from the default section only
    pub fn get_raw_default(&self, option: &str) -> Result<String> {
        self.store
            .get_default(option)
            .map(str::to_string)
            .ok_or_else(|| Error::not_found(crate::store::DEFAULT_SECTION, option))
    }

    /// Get the fully unfolded string value.
    ///
    /// Variables are unfolded to completion first, then environment
    /// references, so `${name}` tokens inside a variable's raw value are
    /// resolved in the second pass.
    pub fn get_string(&self, section: &str, option: &str) -> Result<String> {
        let raw = self.get_raw(section, option)?;
        let path = || format!("{}.{}", section, option);

        let unfolded = interpolation::unfold(
            &raw,
            &Reference::variable(),
            self.options.max_depth,
            &SectionLookup::new(&self.store, section),
        )
        .map_err(|e| e.with_path(path()))?;

        interpolation::unfold(
            &unfolded,
            &Reference::environment(),
            self.options.max_depth,
            &EnvLookup::new(self.env.as_ref()),
        )
        .map_err(|e| e.with_path(path()))
    }

    /// Get a boolean value; see [`BOOL_TOKENS`]
    pub fn get_bool(&self, section: &str, option: &str) -> Result<bool> {
        let value = self.get_string(section, option)?;
        parse_bool(&value).ok_or_else(|| {
            Error::type_conversion(
                format!("{}.{}", section, option),
                format!("could not parse bool value: {}", value),
            )
        })
    }

    /// Get a base-10 integer value
    pub fn get_i64(&self, section: &str, option: &str) -> Result<i64> {
        let value = self.get_string(section, option)?;
        value.parse().map_err(|e| {
            Error::type_conversion(
                format!("{}.{}", section, option),
                format!("could not parse integer value '{}': {}", value, e),
            )
        })
    }

    /// Get a floating point value
    pub fn get_f64(&self, section: &str, option: &str) -> Result<f64> {
        let value = self.get_string(section, option)?;
        value.parse().map_err(|e| {
            Error::type_conversion(
                format!("{}.{}", section, option),
                format!("could not parse float value '{}': {}", value, e),
            )
        })
    }

    /// Fill the bound fields of a record from this config.
    ///
    /// Fields whose option is missing keep their current value; any
    /// other failure aborts and is returned.
    pub fn populate<'a>(&self, target: impl Into<Target<'a>>) -> Result<()> {
        bind::populate(target.into(), self)
    }

    /// Export the configuration section by section
    ///
    /// # Arguments
    /// * `resolve` - If true, unfold references. If false, show raw values.
    pub fn to_map(&self, resolve: bool) -> Result<IndexMap<String, IndexMap<String, String>>> {
        let mut out = IndexMap::new();
        for section in self.store.sections() {
            let mut options = IndexMap::new();
            if let Some(stored) = self.store.section(section) {
                for (option, raw) in stored {
                    let value = if resolve {
                        self.get_string(section, option)?
                    } else {
                        raw.clone()
                    };
                    options.insert(option.clone(), value);
                }
            }
            out.insert(section.to_string(), options);
        }
        Ok(out)
    }

    /// Export the configuration as YAML
    pub fn to_yaml(&self, resolve: bool) -> Result<String> {
        let map = self.to_map(resolve)?;
        serde_yaml::to_string(&map).map_err(|e| Error::parse(e.to_string()))
    }

    /// Export the configuration as JSON
    pub fn to_json(&self, resolve: bool) -> Result<String> {
        let map = self.to_map(resolve)?;
        serde_json::to_string_pretty(&map).map_err(|e| Error::parse(e.to_string()))
    }
}

fn read_store(path: &Path) -> Result<Store> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::io(format!("Failed to read file '{}': {}", path.display(), e))
            .with_path(path.display().to_string())
    })?;
    ini::parse(&content, Some(&path.display().to_string()))
}
