//! `${NAME}` environment substitution for recipe parameters

use std::str::FromStr;

use crate::error::{Error, Result};

/// Extract the variable name from a `${NAME}` sentinel, if the string is one
pub fn sentinel_name(s: &str) -> Option<&str> {
    s.strip_prefix("${").and_then(|rest| rest.strip_suffix('}'))
}

/// Resolve a `${NAME}` sentinel to the variable's raw value.
///
/// A plain string passes through unchanged; an unset variable is fatal.
pub fn resolve(s: &str) -> Result<String> {
    match sentinel_name(s) {
        Some(name) => std::env::var(name).map_err(|_| Error::EnvVar(name.to_string())),
        None => Ok(s.to_string()),
    }
}

/// Resolve a sentinel (or plain literal string) and parse it
pub fn resolve_parsed<T: FromStr>(s: &str) -> Result<T> {
    let raw = resolve(s)?;
    raw.parse().map_err(|_| match sentinel_name(s) {
        Some(name) => Error::EnvVar(name.to_string()),
        None => Error::InvalidArgument(format!("cannot parse parameter '{}'", s)),
    })
}
