//! @acp:module "Conventions"
//! @acp:summary "Path, verb and envelope rules shared by dispatcher and emitter"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! # Shared Conventions
//!
//! Everything the runtime dispatcher and the stub emitter must agree on:
//! - Endpoint path derivation (`prefix + "/" + kebab(method)`)
//! - HTTP verb inference from method names and parameter types
//! - The primitive type filter
//! - The `{result}` / `{error}` response envelope
//!
//! Both paths call into this module; neither re-derives these rules locally.

pub mod envelope;
pub mod naming;
pub mod verb;

pub use envelope::Envelope;
pub use naming::{endpoint_path, kebab_case};
pub use verb::{verb_of, Verb};

/// Type names that never trigger declaration resolution or generated imports
pub const PRIMITIVE_TYPES: &[&str] = &["string", "number", "boolean", "object", "any", "undefined"];

/// Check whether a single atomic type token is primitive
pub fn is_primitive_token(token: &str) -> bool {
    PRIMITIVE_TYPES.contains(&token)
}

/// Check whether a full type expression is primitive.
///
/// `any[]` and `string | undefined` count as primitive; anything mentioning
/// another name does not.
pub fn is_primitive_type(type_text: &str) -> bool {
    let tokens = type_tokens(type_text);
    !tokens.is_empty() && tokens.iter().all(|t| is_primitive_token(t))
}

/// Split a type expression into atomic name tokens.
///
/// Array brackets, generic brackets, unions, intersections and commas are
/// separators. Tokens keep their order of first appearance and are
/// de-duplicated.
pub fn type_tokens(type_text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in type_text
        .split(|c: char| matches!(c, '[' | ']' | '<' | '>' | '|' | '&' | ',' | '(' | ')') || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Unwrap an async wrapper (`Promise<T>`) to its payload type `T`
pub fn unwrap_async_type(type_text: &str) -> &str {
    let trimmed = type_text.trim();
    trimmed
        .strip_prefix("Promise<")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
        .unwrap_or(trimmed)
}
