//! @acp:module "Naming Conventions"
//! @acp:summary "Kebab-cased endpoint paths"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! Endpoint path derivation
//!
//! `prefix + "/" + kebab(methodName)`, where kebab-casing inserts a `-` before
//! every uppercase letter and lowercases it. No other normalization happens:
//! a prefix without a leading slash stays without one.

/// Kebab-case a method name the way routes are derived
///
/// Every uppercase character becomes `-` followed by its lowercase form, so
/// `storeItemOptional` becomes `store-item-optional` and `getURL` becomes
/// `get-u-r-l`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_uppercase() {
            out.push('-');
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Derive the endpoint path for a method under an API prefix
///
/// A single trailing `/` on the prefix is dropped so `"api/"` and `"api"`
/// produce the same route.
pub fn endpoint_path(prefix: &str, method_name: &str) -> String {
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    format!("{}/{}", prefix, kebab_case(method_name))
}
