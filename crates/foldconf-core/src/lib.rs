//! foldconf-core: section/option configuration with reference unfolding
//!
//! This crate reads INI-style section/option stores and resolves two kinds
//! of references inside values before handing them out:
//! `%(name)s` variables (current section, then the default section) and
//! `${name}` environment variables. Values can be read as strings, bools,
//! integers and floats, or bound onto struct fields.
//!
//! # Example
//!
//! ```rust
//! use foldconf_core::Config;
//!
//! let ini = r#"
//! host = localhost
//!
//! [web]
//! url = http://%(host)s:%(port)s
//! port = 8080
//! "#;
//!
//! let config = Config::from_ini(ini).unwrap();
//! assert_eq!(config.get_string("web", "url").unwrap(), "http://localhost:8080");
//! assert_eq!(config.get_i64("web", "port").unwrap(), 8080);
//! ```

pub mod bind;
pub mod error;
pub mod ini;
pub mod interpolation;
pub mod resolver;
pub mod store;

mod config;

pub use bind::{populate, Bind, Binding, Field, Slot, Target};
pub use config::{parse_bool, Config, ConfigOptions, BOOL_TOKENS};
pub use error::{Error, ErrorKind, Result};
pub use interpolation::{Reference, DEFAULT_MAX_DEPTH};
pub use resolver::{Environment, Lookup, MapEnv, ProcessEnv};
pub use store::{Store, DEFAULT_SECTION};
