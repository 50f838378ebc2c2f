//! foldconf CLI library
//!
//! This module exposes the CLI main function so other binaries can
//! bundle it.

mod cli;

pub use cli::run;
