//! @acp:module "Verb Conventions"
//! @acp:summary "HTTP verb inference from method names and parameter types"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! HTTP verb inference

use serde::{Deserialize, Serialize};

use super::is_primitive_type;

/// HTTP verb an operation is served under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Get string representation used in routes and generated clients
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    /// Whether arguments travel in the query string rather than the body
    pub fn uses_query(&self) -> bool {
        matches!(self, Verb::Get)
    }
}

impl std::str::FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Verb::Get),
            "post" => Ok(Verb::Post),
            "put" => Ok(Verb::Put),
            "delete" => Ok(Verb::Delete),
            _ => Err(format!("Unknown HTTP verb: {}", s)),
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Infer the verb for a method from its name and parameter types
///
/// A `post`/`put`/`delete` name prefix (case-sensitive) wins. Otherwise the
/// verb is `get`, unless a parameter type is non-primitive: complex payloads
/// are never placed on a query string, so those methods become `post`.
pub fn verb_of<S: AsRef<str>>(method_name: &str, param_types: &[S]) -> Verb {
    if method_name.starts_with("post") {
        Verb::Post
    } else if method_name.starts_with("put") {
        Verb::Put
    } else if method_name.starts_with("delete") {
        Verb::Delete
    } else if param_types.iter().any(|t| !is_primitive_type(t.as_ref())) {
        Verb::Post
    } else {
        Verb::Get
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_prefix_selects_verb() {
        assert_eq!(verb_of("postItem", &["string"]), Verb::Post);
        assert_eq!(verb_of("putItem", &["string"]), Verb::Put);
        assert_eq!(verb_of("deleteItem", &["number"]), Verb::Delete);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(verb_of("PostItem", &["string"]), Verb::Get);
    }

    #[test]
    fn test_primitive_params_stay_get() {
        assert_eq!(verb_of("getData", &["number"]), Verb::Get);
        assert_eq!(verb_of("getItems", &[] as &[&str]), Verb::Get);
        assert_eq!(verb_of("listTags", &["any[]", "boolean"]), Verb::Get);
    }

    #[test]
    fn test_non_primitive_forces_post() {
        assert_eq!(verb_of("sendPayload", &["SomeObjectType"]), Verb::Post);
        assert_eq!(verb_of("storeItems", &["string", "Item[]"]), Verb::Post);
    }

    #[test]
    fn test_name_prefix_beats_non_primitive() {
        assert_eq!(verb_of("putUser", &["User"]), Verb::Put);
    }

    #[test]
    fn test_verb_from_str() {
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        assert_eq!("delete".parse::<Verb>().unwrap(), Verb::Delete);
        assert!("patch".parse::<Verb>().is_err());
    }
}
