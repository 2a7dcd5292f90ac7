//! @acp:module "Annotation Registry"
//! @acp:summary "Side-table of API prefixes, exposed operations and parameter types"
//! @acp:domain cli
//! @acp:layer model
//!
//! # Annotation Registry
//!
//! Side-table associating declarations with API metadata:
//! - the API path prefix of a declaration
//! - which methods are exposed operations
//! - the declared parameter types of a method (one tag per parameter)
//!
//! Entries are keyed by [`DeclarationId`], never by instance, so every
//! instance of a declaration shares one entry. The registry is an explicit
//! value: build it, hand it to the dispatcher and the stub emitter, drop it.
//! There is no removal operation.

mod types;

pub use types::ParamType;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parse::{Declaration, DeclarationKind};

/// Stable identifier of an annotated declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationId(String);

impl DeclarationId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeclarationId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DeclarationId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata recorded for one method of a declaration
#[derive(Debug, Clone, Default)]
pub struct MethodEntry {
    /// Marked as an exposed operation
    pub exposed: bool,
    /// Declared parameter types, if any were recorded
    pub param_types: Option<Vec<ParamType>>,
}

/// Metadata recorded for one declaration
#[derive(Debug, Clone, Default)]
struct DeclarationEntry {
    prefix: Option<String>,
    /// Method names in registration order
    order: Vec<String>,
    methods: HashMap<String, MethodEntry>,
}

impl DeclarationEntry {
    fn method_mut(&mut self, name: &str) -> &mut MethodEntry {
        if !self.methods.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.methods.entry(name.to_string()).or_default()
    }
}

/// Declaration metadata side-table
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<DeclarationId, DeclarationEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a declaration as an API with the given path prefix
    pub fn register_api(&mut self, declaration: impl Into<DeclarationId>, prefix: impl Into<String>) {
        let declaration = declaration.into();
        let prefix = prefix.into();
        debug!(%declaration, prefix = %prefix, "Registered API declaration");
        self.entries.entry(declaration).or_default().prefix = Some(prefix);
    }

    /// Mark a method of a declaration as an exposed operation
    pub fn register_operation(&mut self, declaration: impl Into<DeclarationId>, method: &str) {
        let declaration = declaration.into();
        debug!(%declaration, method, "Registered operation");
        self.entries
            .entry(declaration)
            .or_default()
            .method_mut(method)
            .exposed = true;
    }

    /// Record the declared parameter types of a method
    pub fn declare_param_types(
        &mut self,
        declaration: impl Into<DeclarationId>,
        method: &str,
        types: Vec<ParamType>,
    ) {
        self.entries
            .entry(declaration.into())
            .or_default()
            .method_mut(method)
            .param_types = Some(types);
    }

    /// Start a fluent registration for an API declaration
    pub fn api(&mut self, declaration: impl Into<DeclarationId>, prefix: impl Into<String>) -> ApiBuilder<'_> {
        let declaration = declaration.into();
        self.register_api(declaration.clone(), prefix);
        ApiBuilder {
            registry: self,
            declaration,
        }
    }

    pub fn is_exposed(&self, declaration: &DeclarationId, method: &str) -> bool {
        self.entries
            .get(declaration)
            .and_then(|e| e.methods.get(method))
            .map(|m| m.exposed)
            .unwrap_or(false)
    }

    /// Registered prefix, or `None` when the declaration is not an API
    pub fn prefix(&self, declaration: &DeclarationId) -> Option<&str> {
        self.entries
            .get(declaration)
            .and_then(|e| e.prefix.as_deref())
    }

    pub fn is_api(&self, declaration: &DeclarationId) -> bool {
        self.prefix(declaration).is_some()
    }

    pub fn param_types(&self, declaration: &DeclarationId, method: &str) -> Option<&[ParamType]> {
        self.entries
            .get(declaration)
            .and_then(|e| e.methods.get(method))
            .and_then(|m| m.param_types.as_deref())
    }

    /// Exposed operation names in registration order
    pub fn exposed_operations(&self, declaration: &DeclarationId) -> Vec<&str> {
        self.entries
            .get(declaration)
            .map(|e| {
                e.order
                    .iter()
                    .filter(|name| e.methods.get(*name).map(|m| m.exposed).unwrap_or(false))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record a parsed class declaration's decorators
    ///
    /// The class is registered when it carries `api_decorator`; its prefix is
    /// the decorator's first argument (empty when absent). Methods carrying
    /// `method_decorator` become exposed operations. Parameter types are not
    /// recorded here: the static side reads them from the declaration itself.
    /// Returns whether the declaration was an API.
    pub fn record_source_declaration(
        &mut self,
        declaration: &Declaration,
        api_decorator: &str,
        method_decorator: &str,
    ) -> bool {
        if declaration.kind != DeclarationKind::Class {
            return false;
        }
        let Some(api) = declaration.decorator(api_decorator) else {
            return false;
        };
        let id = DeclarationId::new(declaration.name.as_str());
        self.register_api(id.clone(), api.first_string_argument().unwrap_or_default());
        for method in declaration.methods() {
            if method.has_decorator(method_decorator) {
                self.register_operation(id.clone(), &method.name);
            }
        }
        true
    }
}

/// Fluent registration of one API declaration
#[derive(Debug)]
pub struct ApiBuilder<'a> {
    registry: &'a mut Registry,
    declaration: DeclarationId,
}

impl ApiBuilder<'_> {
    /// Register an exposed operation with its declared parameter types
    pub fn operation(self, method: &str, types: impl IntoIterator<Item = ParamType>) -> Self {
        self.registry.register_operation(self.declaration.clone(), method);
        self.registry
            .declare_param_types(self.declaration.clone(), method, types.into_iter().collect());
        self
    }

    /// Record parameter types of a method that is not exposed
    pub fn method(self, method: &str, types: impl IntoIterator<Item = ParamType>) -> Self {
        self.registry
            .declare_param_types(self.declaration.clone(), method, types.into_iter().collect());
        self
    }

    pub fn id(&self) -> &DeclarationId {
        &self.declaration
    }
}
