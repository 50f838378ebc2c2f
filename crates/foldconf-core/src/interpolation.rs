//! Reference unfolding
//!
//! Recognizes two reference syntaxes inside option values:
//! - `%(name)s` - variable, looked up in the current then default section
//! - `${name}` - environment variable
//!
//! Unfolding is a loop of pure splice steps: find the leftmost reference,
//! look its name up, rebuild the string around the replacement and go
//! again. A replacement may itself contain references, so chains resolve
//! in one call. The loop is bounded so self-references terminate.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::resolver::Lookup;

/// Default bound on splice steps per unfolding
pub const DEFAULT_MAX_DEPTH: usize = 200;

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\(([a-zA-Z0-9_.\-]+)\)s").expect("valid variable regex"));

static ENVIRONMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z0-9_.\-]+)\}").expect("valid environment regex"));

/// A reference syntax: a pattern capturing the name in group 1, plus the
/// widths of the markers around it
#[derive(Debug, Clone, Copy)]
pub struct Reference<'r> {
    pub pattern: &'r Regex,
    /// Width of the marker before the name (`%(` and `${` are both 2)
    pub head: usize,
    /// Width of the marker after the name (`)s` is 2, `}` is 1)
    pub tail: usize,
}

impl<'r> Reference<'r> {
    pub fn new(pattern: &'r Regex, head: usize, tail: usize) -> Self {
        Self {
            pattern,
            head,
            tail,
        }
    }
}

impl Reference<'static> {
    /// `%(name)s`
    pub fn variable() -> Self {
        Self::new(&VARIABLE_RE, 2, 2)
    }

    /// `${name}`
    pub fn environment() -> Self {
        Self::new(&ENVIRONMENT_RE, 2, 1)
    }
}

/// Perform a single splice step.
///
/// Returns `Ok(None)` when `value` holds no reference, otherwise the value
/// with its leftmost reference replaced.
pub fn splice_next(
    value: &str,
    reference: &Reference<'_>,
    lookup: &dyn Lookup,
) -> Result<Option<String>> {
    let Some(caps) = reference.pattern.captures(value) else {
        return Ok(None);
    };
    let name = caps
        .get(1)
        .ok_or_else(|| Error::parse("reference pattern has no capture group for the name"))?;

    let replacement = lookup.lookup(name.as_str());
    if replacement.is_empty() {
        return Err(Error::unresolved_reference(name.as_str()));
    }

    let prefix = name
        .start()
        .checked_sub(reference.head)
        .and_then(|end| value.get(..end));
    let suffix = value.get(name.end() + reference.tail..);
    match (prefix, suffix) {
        (Some(prefix), Some(suffix)) => {
            let mut next = String::with_capacity(prefix.len() + replacement.len() + suffix.len());
            next.push_str(prefix);
            next.push_str(&replacement);
            next.push_str(suffix);
            Ok(Some(next))
        }
        _ => Err(Error::parse(format!(
            "reference markers around '{}' do not fit the value",
            name.as_str()
        ))),
    }
}

/// Unfold every reference in `value`, up to `max_depth` splice steps.
///
/// An empty lookup result fails with an unresolved reference error naming
/// the reference. Running out of steps fails with a depth error, even when
/// the last step happened to leave no reference behind.
pub fn unfold(
    value: &str,
    reference: &Reference<'_>,
    max_depth: usize,
    lookup: &dyn Lookup,
) -> Result<String> {
    let mut current = value.to_string();
    for depth in 0..max_depth {
        match splice_next(&current, reference, lookup)? {
            Some(next) => {
                log::trace!("unfold step {}: {:?} -> {:?}", depth, current, next);
                current = next;
            }
            None => return Ok(current),
        }
    }
    Err(Error::depth_exceeded(max_depth))
}
