//! @acp:module "Interface Emission"
//! @acp:summary "Recursive declaration graph rendering"
//! @acp:domain cli
//! @acp:layer service
//!
//! Recursive interface emission
//!
//! Renders a declaration and, when recursive, every declaration its
//! properties reference, dependencies first. The caller threads an
//! [`EmittedNames`] set through a whole pass so no name is emitted twice.

use tracing::{debug, trace};

use crate::error::Result;
use crate::parse::{Declaration, DeclarationKind};
use crate::resolve::{referenced_types, DeclarationResolver};

/// Names already emitted (or being emitted) during one pass
#[derive(Debug, Default, Clone)]
pub struct EmittedNames {
    names: Vec<String>,
}

impl EmittedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Reserve a name; returns false if it was already present
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Names in reservation order
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// Output of one interface graph emission
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InterfaceGraph {
    pub text: String,
    /// Names emitted, descendants first
    pub names: Vec<String>,
}

impl InterfaceGraph {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn append(&mut self, other: InterfaceGraph) {
        if other.is_empty() {
            return;
        }
        self.text.push_str(&other.text);
        self.text.push_str("\n\n");
        self.names.extend(other.names);
    }
}

/// Emit `declaration` and, if `recursive`, the declarations it references
///
/// The name is reserved in `emitted` before children are visited, so
/// self-referential and mutually referential types terminate. Property
/// types resolve against the file the declaration was parsed from; names
/// that do not resolve (library or global types) are skipped.
pub fn emit_interface_graph(
    resolver: &mut DeclarationResolver,
    declaration: &Declaration,
    recursive: bool,
    emitted: &mut EmittedNames,
) -> Result<InterfaceGraph> {
    let mut out = InterfaceGraph::default();
    if !emitted.insert(&declaration.name) {
        trace!(name = %declaration.name, "Declaration already emitted");
        return Ok(out);
    }

    if recursive {
        for type_name in referenced_types(declaration) {
            if emitted.contains(&type_name) {
                continue;
            }
            match resolver.resolve_from(&type_name, &declaration.source_path)? {
                Some(child) => {
                    let child_graph = emit_interface_graph(resolver, &child, recursive, emitted)?;
                    out.append(child_graph);
                    out.append(emit_alias(&type_name, &child, emitted));
                }
                None => debug!(
                    name = %type_name,
                    parent = %declaration.name,
                    "Referenced type not resolvable, leaving as is"
                ),
            }
        }
    }

    out.text.push_str(&render_declaration(declaration));
    out.names.push(declaration.name.clone());
    Ok(out)
}

/// Emit `type Local = Name;` for a declaration imported under another name
///
/// Empty when `local` is the declaration's own name or was already emitted.
pub fn emit_alias(local: &str, declaration: &Declaration, emitted: &mut EmittedNames) -> InterfaceGraph {
    if local == declaration.name || !emitted.insert(local) {
        return InterfaceGraph::default();
    }
    InterfaceGraph {
        text: format!("type {} = {};", local, declaration.name),
        names: vec![local.to_string()],
    }
}

/// Render one declaration as client-side type text
///
/// Classes become structural interfaces listing their typed properties.
/// Interfaces and enums are copied verbatim.
pub fn render_declaration(declaration: &Declaration) -> String {
    match declaration.kind {
        DeclarationKind::Class => {
            let mut text = format!("interface {} {{\n", declaration.name);
            for property in declaration.properties() {
                if let Some(type_text) = &property.type_text {
                    let optional = if property.optional { "?" } else { "" };
                    text.push_str(&format!("\t{}{}: {};\n", property.name, optional, type_text));
                }
            }
            text.push('}');
            text
        }
        DeclarationKind::Interface | DeclarationKind::Enum => declaration.text.clone(),
    }
}
