//! @acp:module "Parameter Types"
//! @acp:summary "Declared parameter type tags"
//! @acp:domain cli
//! @acp:layer model
//!
//! Declared parameter type tags

use serde::{Deserialize, Serialize};

use crate::conventions::is_primitive_token;

/// Runtime type tag of one parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    /// Untyped array (`any[]`)
    Array,
    /// Reference to another declaration, e.g. a payload class
    Named(String),
}

impl ParamType {
    /// Type name as written in TypeScript
    pub fn type_name(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "any[]",
            ParamType::Named(name) => name,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, ParamType::Named(_))
    }

    /// Values of this type are read from the request body, not the query string
    pub fn reads_from_body(&self) -> bool {
        matches!(self, ParamType::Object | ParamType::Named(_))
    }

    /// Map a TypeScript type annotation onto a tag
    ///
    /// Array types collapse to [`ParamType::Array`] unless the element type
    /// is a declaration; `any` and unions of primitives collapse to
    /// [`ParamType::Object`].
    pub fn from_type_text(text: &str) -> Self {
        let text = text.trim();
        match text {
            "string" => return ParamType::String,
            "number" => return ParamType::Number,
            "boolean" => return ParamType::Boolean,
            "object" | "any" | "" => return ParamType::Object,
            _ => {}
        }
        let element = text
            .strip_suffix("[]")
            .or_else(|| text.strip_prefix("Array<").and_then(|t| t.strip_suffix('>')));
        let tokens = crate::conventions::type_tokens(element.unwrap_or(text));
        match tokens.iter().find(|t| !is_primitive_token(t)) {
            Some(named) => ParamType::Named(named.clone()),
            None if element.is_some() => ParamType::Array,
            None => ParamType::Object,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

impl AsRef<str> for ParamType {
    fn as_ref(&self) -> &str {
        self.type_name()
    }
}
