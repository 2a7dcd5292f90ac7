//! @acp:module "Errors"
//! @acp:summary "Error types for resolution, emission and dispatch setup"
//! @acp:domain cli
//! @acp:layer model
//!
//! Error types for restgen
//!
//! Resolution and emission errors surface synchronously to the caller.
//! Per-request failures never reach this type: the dispatcher turns them
//! into the error envelope at the handler boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for restgen operations
#[derive(Error, Debug)]
pub enum RestgenError {
    /// Source text is not valid TypeScript
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// No API class (or no class matching the requested name) was found
    #[error("No API declaration found in {path}{}", filter_suffix(.class_name))]
    MissingDeclaration {
        path: PathBuf,
        class_name: Option<String>,
    },

    /// Declared parameter types and parameter names disagree for a method
    #[error("Length of method types and argument names does not match for {declaration}.{method}: {types} types, {names} names")]
    ArityMismatch {
        declaration: String,
        method: String,
        types: usize,
        names: usize,
    },

    /// Object was handed to the dispatcher without an API registration
    #[error("{0} is not registered as an API declaration")]
    NotAnApi(String),

    /// Declaration file does not exist
    #[error("Cannot find source file: {0}")]
    SourceNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

fn filter_suffix(class_name: &Option<String>) -> String {
    match class_name {
        Some(name) => format!(" matching class '{}'", name),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RestgenError>;
