//! @acp:module "Method Signatures"
//! @acp:summary "Parameter names recovered from method signatures"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! Method signatures of live API objects

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{RestgenError, Result};

/// Name and ordered parameter names of one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<String>,
}

impl MethodSignature {
    pub fn new<S: Into<String>>(name: impl Into<String>, params: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a signature from a method's source text
    ///
    /// Accepts anything from `getData(count?: number)` to a full method
    /// declaration with modifiers and a body. Comments are ignored, default
    /// values and type annotations are dropped, and parameters are split on
    /// commas that are not nested inside brackets or string literals.
    pub fn parse(text: &str) -> Result<Self> {
        let text = strip_comments(text);
        let open = text
            .find('(')
            .ok_or_else(|| RestgenError::Other(format!("No parameter list in signature: {}", text.trim())))?;

        let name = text[..open]
            .split_whitespace()
            .next_back()
            .map(|n| n.trim_start_matches('*').to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| RestgenError::Other(format!("No method name in signature: {}", text.trim())))?;

        let close = matching_paren(&text, open)
            .ok_or_else(|| RestgenError::Other(format!("Unbalanced parameter list in signature of {}", name)))?;

        let params = split_top_level(&text[open + 1..close], ',')
            .into_iter()
            .filter_map(|piece| parameter_name(&piece))
            .collect();

        Ok(Self { name, params })
    }
}

/// Block and line comments
static COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").unwrap());

fn strip_comments(text: &str) -> String {
    COMMENT_PATTERN.replace_all(text, " ").into_owned()
}

/// Walk `text` from an opening paren, tracking nesting and string literals
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut previous = ' ';

    for c in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            current.push(c);
            previous = c;
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            // `=>` closes nothing
            '>' if previous == '=' => {}
            ')' | ']' | '}' | '>' => depth -= 1,
            _ => {}
        }
        if c == separator && depth == 0 {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        previous = c;
    }
    pieces.push(current);
    pieces
}

/// Bare binding name of one parameter declaration
fn parameter_name(piece: &str) -> Option<String> {
    let piece = piece.trim().trim_start_matches("...");
    let end = piece
        .find(|c: char| matches!(c, '=' | ':' | '?'))
        .unwrap_or(piece.len());
    let name = piece[..end]
        .split_whitespace()
        .next_back()
        .unwrap_or("")
        .to_string();
    (!name.is_empty()).then_some(name)
}
