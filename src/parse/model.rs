//! @acp:module "Syntax Model"
//! @acp:summary "Owned declarations, members and imports of a parsed file"
//! @acp:domain cli
//! @acp:layer model
//!
//! Owned syntax model of a parsed TypeScript file
//!
//! The parser converts the tree-sitter tree into these types immediately, so
//! nothing downstream holds on to the tree or the source buffer.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Parsed source file
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    /// Path the file was parsed from (as given by the caller)
    pub path: PathBuf,
    /// Import statements in source order
    pub imports: Vec<Import>,
    /// Top-level class, interface and enum declarations in source order
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    /// Find a top-level declaration by name
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Class declarations only
    pub fn classes(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Class)
    }

    /// Directory relative imports are resolved against
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// One `import ... from "..."` statement
#[derive(Debug, Clone, Serialize)]
pub struct Import {
    /// Text of the import clause (`{ User, Role as R }`)
    pub clause: String,
    /// Names bound by the clause
    pub bindings: Vec<ImportBinding>,
    /// Module specifier without quotes (`./models/user`)
    pub specifier: String,
    pub line: usize,
}

impl Import {
    /// Relative specifiers are resolvable on disk; package imports are not
    pub fn is_relative(&self) -> bool {
        self.specifier.starts_with("./") || self.specifier.starts_with("../")
    }

    /// Binding that introduces `local` into the importing file
    pub fn binding_for(&self, local: &str) -> Option<&ImportBinding> {
        self.bindings.iter().find(|b| b.local == local)
    }
}

/// A name bound by an import clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    /// Name exported by the imported module (`default` for default imports)
    pub imported: String,
    /// Name visible in the importing file
    pub local: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
        }
    }
}

/// Named class, interface or enum declaration
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub exported: bool,
    pub decorators: Vec<Decorator>,
    pub members: Vec<Member>,
    /// Verbatim source of the declaration node (without `export`)
    pub text: String,
    /// File the declaration was parsed from
    pub source_path: PathBuf,
    pub line: usize,
}

impl Declaration {
    pub fn decorator(&self, name: &str) -> Option<&Decorator> {
        self.decorators.iter().find(|d| d.name == name)
    }

    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorator(name).is_some()
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Property(_) => None,
        })
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.members.iter().filter_map(|m| match m {
            Member::Property(property) => Some(property),
            Member::Method(_) => None,
        })
    }
}

/// `@Name` or `@Name(args...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decorator {
    pub name: String,
    /// Raw argument source texts
    pub arguments: Vec<String>,
}

impl Decorator {
    /// First argument with string quotes removed
    pub fn first_string_argument(&self) -> Option<String> {
        self.arguments
            .first()
            .map(|arg| arg.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Member {
    Property(Property),
    Method(Method),
}

/// Class field or interface property signature
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub name: String,
    pub type_text: Option<String>,
    pub optional: bool,
}

/// Class method or interface method signature
#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub name: String,
    pub decorators: Vec<Decorator>,
    pub params: Vec<Parameter>,
    /// Return type annotation, if written
    pub return_type: Option<String>,
    pub is_static: bool,
    pub is_async: bool,
    pub line: usize,
}

impl Method {
    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorators.iter().any(|d| d.name == name)
    }
}

/// Method parameter
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_text: Option<String>,
    /// Written with `?`
    pub question: bool,
    /// Written as `...name`
    pub rest: bool,
    /// Default value source text
    pub default: Option<String>,
}

impl Parameter {
    /// `?`, a default value and `...rest` all make a parameter optional
    pub fn is_optional(&self) -> bool {
        self.question || self.rest || self.default.is_some()
    }

    /// Declared type, `any` when unannotated
    pub fn type_or_any(&self) -> &str {
        self.type_text.as_deref().unwrap_or("any")
    }
}
