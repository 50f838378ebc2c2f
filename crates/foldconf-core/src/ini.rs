//! INI reader
//!
//! Accepted grammar:
//! - blank lines and lines starting with `#` or `;` are ignored
//! - `[name]` opens a section; `[DEFAULT]` (any case) is the default section
//! - `option = value` or `option: value`, split on the first `=` or `:`
//! - a line starting with whitespace continues the previous value
//! - options before the first header go to the default section

use crate::error::{Error, Result, SourceLocation};
use crate::store::{Store, DEFAULT_SECTION};

impl Store {
    /// Parse INI text into a store
    pub fn from_ini(text: &str) -> Result<Self> {
        parse(text, None)
    }
}

/// Parse INI text, tagging errors with `file` when given
pub fn parse(text: &str, file: Option<&str>) -> Result<Store> {
    let mut store = Store::new();
    let mut section = DEFAULT_SECTION.to_string();
    let mut last_option: Option<String> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let at = |err: Error| match file {
            Some(f) => err.with_source_location(SourceLocation {
                file: f.to_string(),
                line: Some(line_no),
            }),
            None => err.with_path(format!("line {}", line_no)),
        };

        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if raw_line.starts_with(char::is_whitespace) {
            if let Some(option) = &last_option {
                let previous = store
                    .section(&section)
                    .and_then(|s| s.get(option))
                    .cloned()
                    .unwrap_or_default();
                let joined = if previous.is_empty() {
                    trimmed.to_string()
                } else {
                    format!("{}\n{}", previous, trimmed)
                };
                store.add_option(&section, option.clone(), joined);
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or_else(|| at(Error::parse(format!("missing ']' in section header: {}", trimmed))))?
                .trim();
            if name.is_empty() {
                return Err(at(Error::parse("empty section name")));
            }
            section = if name.eq_ignore_ascii_case(DEFAULT_SECTION) {
                DEFAULT_SECTION.to_string()
            } else {
                name.to_string()
            };
            store.add_section(&section);
            last_option = None;
            continue;
        }

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(at(Error::parse(format!(
                "expected 'option = value', got: {}",
                trimmed
            ))));
        };
        let option = trimmed[..split].trim();
        let value = trimmed[split + 1..].trim();
        if option.is_empty() {
            return Err(at(Error::parse("empty option name")));
        }

        let in_section = store
            .section(&section)
            .is_some_and(|s| s.contains_key(option));
        if in_section {
            log::warn!(
                "option '{}' in section [{}] redefined at line {}",
                option,
                section,
                line_no
            );
        }
        store.add_option(&section, option, value);
        last_option = Some(option.to_string());
    }

    Ok(store)
}
