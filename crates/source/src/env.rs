//! `$VAR` placeholders in source descriptors.

use std::collections::BTreeMap;

/// Replaces a value of the form `$NAME` with the environment variable `NAME`
/// (a `.env` file in the working directory is consulted too). Anything else,
/// or a variable that is not set, is returned unchanged.
pub fn resolve(value: &str) -> String {
    let Some(name) = value.strip_prefix('$') else {
        return value.to_string();
    };
    match dotenvy::var(name) {
        Ok(resolved) => resolved,
        Err(_) => {
            tracing::warn!(variable = name, "Environment variable is not set, using the literal value");
            value.to_string()
        }
    }
}

/// Resolves every value of a string map.
pub fn resolve_map(values: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(key, value)| (key.clone(), resolve(value)))
        .collect()
}
