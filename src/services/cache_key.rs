// src/services/cache_key.rs
// DOCUMENTATION: Request cache key derivation
// PURPOSE: Turn (base address, parameters) into a stable string that identifies a request

use std::collections::HashMap;

/// Query parameters of an outbound request
pub type QueryParams = HashMap<String, String>;

/// Parameter names that carry credentials and never affect response content
pub const SECRET_PARAMS: &[&str] = &["api_key", "key"];

/// Separator between `name-value` pairs
const PAIR_DELIMITER: &str = "_";

/// Derive the cache key of a request
/// DOCUMENTATION: Drops excluded names, sorts the rest by name and appends
/// `name-value` pairs joined by `_` to the base address. Without parameters the
/// key is the base address alone. Two requests that differ only in an excluded
/// parameter map to the same key.
///
/// # Arguments
/// * `base_url` - Request address without query string
/// * `params` - Query parameters, in any order
/// * `excluded` - Parameter names left out of the key
pub fn derive_key(base_url: &str, params: Option<&QueryParams>, excluded: &[&str]) -> String {
    let Some(params) = params else {
        return base_url.to_string();
    };

    let mut names: Vec<&String> = params
        .keys()
        .filter(|name| !excluded.contains(&name.as_str()))
        .collect();
    names.sort();

    let pairs: Vec<String> = names
        .into_iter()
        .map(|name| format!("{}-{}", name, params[name]))
        .collect();

    format!("{}{}", base_url, pairs.join(PAIR_DELIMITER))
}
