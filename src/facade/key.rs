//! Cache Key Derivation
//!
//! Deterministic string keys from semantically meaningful inputs.
//! Callers coalesced on one logical request must derive the identical
//! key, so query parameters and roles are sorted before serialization.

// == Request Key ==
/// Key for an API response: path plus sorted query parameters.
pub fn request_key(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let mut sorted = params.to_vec();
    sorted.sort_unstable();
    let query: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    format!("{}?{}", path, query.join("&"))
}

// == Auth Key ==
/// Key for an authorization decision: user plus sorted, deduplicated
/// roles.
pub fn auth_key(user_id: &str, roles: &[&str]) -> String {
    let mut sorted = roles.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    format!("auth:{}:{}", user_id, sorted.join(","))
}

// == Object Key ==
/// Key for a stored object of a given kind.
pub fn object_key(kind: &str, id: &str) -> String {
    format!("{}:{}", kind, id)
}
