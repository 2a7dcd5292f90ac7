//! @acp:module "Parser"
//! @acp:summary "TypeScript source parsing via tree-sitter"
//! @acp:domain cli
//! @acp:layer service
//!
//! TypeScript source parsing
//!
//! Parses one file with tree-sitter and converts the tree into the owned
//! [`SourceFile`] model: imports plus top-level class, interface and enum
//! declarations with their decorators and typed members.
//!
//! Parsing is pure. [`SourceParser::parse`] takes the text from the caller;
//! [`SourceParser::parse_file`] is the only entry point that touches disk.

mod model;

pub use model::{
    Declaration, DeclarationKind, Decorator, Import, ImportBinding, Member, Method, Parameter,
    Property, SourceFile,
};

use std::path::Path;

use tracing::debug;
use tree_sitter::{Node, Parser as TsParser};

use crate::error::{RestgenError, Result};

/// Parser for TypeScript source files
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file from disk
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<SourceFile> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RestgenError::SourceNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        self.parse(path, &text)
    }

    /// Parse source text already loaded by the caller
    pub fn parse<P: AsRef<Path>>(&self, path: P, text: &str) -> Result<SourceFile> {
        let path = path.as_ref();
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| RestgenError::Other(format!("Failed to load TypeScript grammar: {}", e)))?;

        let tree = parser.parse(text, None).ok_or_else(|| RestgenError::Parse {
            path: path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => format!(
                    "unexpected syntax at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "invalid syntax".to_string(),
            };
            return Err(RestgenError::Parse {
                path: path.to_path_buf(),
                message,
            });
        }

        let extractor = Extractor {
            source: text.as_bytes(),
            path,
        };
        let file = extractor.extract(root);
        debug!(
            path = %path.display(),
            imports = file.imports.len(),
            declarations = file.declarations.len(),
            "Parsed source file"
        );
        Ok(file)
    }
}

/// Locate the first error or missing node, depth first
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

struct Extractor<'a> {
    source: &'a [u8],
    path: &'a Path,
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node<'_>) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    fn extract(&self, root: Node<'_>) -> SourceFile {
        let mut imports = Vec::new();
        let mut declarations = Vec::new();

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            match statement.kind() {
                "import_statement" => {
                    if let Some(import) = self.import(statement) {
                        imports.push(import);
                    }
                }
                "export_statement" => {
                    let outer = self.decorators_of(statement);
                    if let Some(inner) = statement.child_by_field_name("declaration") {
                        if let Some(decl) = self.declaration(inner, outer, true) {
                            declarations.push(decl);
                        }
                    }
                }
                _ => {
                    if let Some(decl) = self.declaration(statement, Vec::new(), false) {
                        declarations.push(decl);
                    }
                }
            }
        }

        SourceFile {
            path: self.path.to_path_buf(),
            imports,
            declarations,
        }
    }

    fn import(&self, node: Node<'_>) -> Option<Import> {
        let source = node.child_by_field_name("source")?;
        let specifier = self
            .text(source)
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();

        let mut cursor = node.walk();
        let clause = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "import_clause");

        let mut bindings = Vec::new();
        let clause_text = match clause {
            Some(clause) => {
                self.import_bindings(clause, &mut bindings);
                self.text(clause)
            }
            // Side-effect import: `import "./polyfills"`
            None => String::new(),
        };

        Some(Import {
            clause: clause_text,
            bindings,
            specifier,
            line: node.start_position().row + 1,
        })
    }

    fn import_bindings(&self, clause: Node<'_>, out: &mut Vec<ImportBinding>) {
        let mut cursor = clause.walk();
        for child in clause.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => out.push(ImportBinding {
                    imported: "default".to_string(),
                    local: self.text(child),
                }),
                "named_imports" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = self.text(name);
                        let local = spec
                            .child_by_field_name("alias")
                            .map(|alias| self.text(alias))
                            .unwrap_or_else(|| imported.clone());
                        out.push(ImportBinding { imported, local });
                    }
                }
                // `* as ns` binds a namespace, not a declaration name
                _ => {}
            }
        }
    }

    fn declaration(
        &self,
        node: Node<'_>,
        mut decorators: Vec<Decorator>,
        exported: bool,
    ) -> Option<Declaration> {
        let kind = match node.kind() {
            "class_declaration" | "abstract_class_declaration" | "class" => DeclarationKind::Class,
            "interface_declaration" => DeclarationKind::Interface,
            "enum_declaration" => DeclarationKind::Enum,
            _ => return None,
        };
        let name = self.text(node.child_by_field_name("name")?);
        decorators.extend(self.decorators_of(node));

        let members = match (kind, node.child_by_field_name("body")) {
            (DeclarationKind::Class, Some(body)) => self.class_members(body),
            (DeclarationKind::Interface, Some(body)) => self.interface_members(body),
            _ => Vec::new(),
        };

        Some(Declaration {
            name,
            kind,
            exported,
            decorators,
            members,
            text: self.text(node),
            source_path: self.path.to_path_buf(),
            line: node.start_position().row + 1,
        })
    }

    fn decorators_of(&self, node: Node<'_>) -> Vec<Decorator> {
        let mut cursor = node.walk();
        node.children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .filter_map(|c| self.decorator(c))
            .collect()
    }

    fn decorator(&self, node: Node<'_>) -> Option<Decorator> {
        let expr = node.named_child(0)?;
        match expr.kind() {
            "call_expression" => {
                let function = expr.child_by_field_name("function")?;
                let mut arguments = Vec::new();
                if let Some(args) = expr.child_by_field_name("arguments") {
                    let mut cursor = args.walk();
                    arguments = args
                        .named_children(&mut cursor)
                        .filter(|a| a.kind() != "comment")
                        .map(|a| self.text(a))
                        .collect();
                }
                Some(Decorator {
                    name: self.text(function),
                    arguments,
                })
            }
            _ => Some(Decorator {
                name: self.text(expr),
                arguments: Vec::new(),
            }),
        }
    }

    fn class_members(&self, body: Node<'_>) -> Vec<Member> {
        let mut members = Vec::new();
        // Member decorators precede their member as siblings in the class body
        let mut pending: Vec<Decorator> = Vec::new();

        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "decorator" => {
                    if let Some(d) = self.decorator(child) {
                        pending.push(d);
                    }
                }
                "method_definition" => {
                    let mut decorators = std::mem::take(&mut pending);
                    decorators.extend(self.decorators_of(child));
                    if let Some(method) = self.method(child, decorators) {
                        members.push(Member::Method(method));
                    }
                }
                "public_field_definition" => {
                    pending.clear();
                    if let Some(property) = self.property(child) {
                        members.push(Member::Property(property));
                    }
                }
                _ => pending.clear(),
            }
        }
        members
    }

    fn interface_members(&self, body: Node<'_>) -> Vec<Member> {
        let mut members = Vec::new();
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "property_signature" => {
                    if let Some(property) = self.property(child) {
                        members.push(Member::Property(property));
                    }
                }
                "method_signature" => {
                    if let Some(method) = self.method(child, Vec::new()) {
                        members.push(Member::Method(method));
                    }
                }
                _ => {}
            }
        }
        members
    }

    fn property(&self, node: Node<'_>) -> Option<Property> {
        let name = self.text(node.child_by_field_name("name")?);
        Some(Property {
            name,
            type_text: node
                .child_by_field_name("type")
                .and_then(|t| self.annotation_type(t)),
            optional: has_token(node, "?"),
        })
    }

    fn method(&self, node: Node<'_>, decorators: Vec<Decorator>) -> Option<Method> {
        let name = self.text(node.child_by_field_name("name")?);
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        Some(Method {
            name,
            decorators,
            params,
            return_type: node
                .child_by_field_name("return_type")
                .and_then(|t| self.annotation_type(t)),
            is_static: has_token(node, "static"),
            is_async: has_token(node, "async"),
            line: node.start_position().row + 1,
        })
    }

    fn parameters(&self, node: Node<'_>) -> Vec<Parameter> {
        let mut params = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if !matches!(child.kind(), "required_parameter" | "optional_parameter") {
                continue;
            }
            let Some(pattern) = child.child_by_field_name("pattern") else {
                continue;
            };
            let rest = pattern.kind() == "rest_pattern";
            let name = if rest {
                self.text(pattern).trim_start_matches("...").to_string()
            } else {
                self.text(pattern)
            };
            params.push(Parameter {
                name,
                type_text: child
                    .child_by_field_name("type")
                    .and_then(|t| self.annotation_type(t)),
                question: child.kind() == "optional_parameter",
                rest,
                default: child.child_by_field_name("value").map(|v| self.text(v)),
            });
        }
        params
    }

    /// Type text of a `type_annotation` node, without the leading colon
    fn annotation_type(&self, node: Node<'_>) -> Option<String> {
        let inner = if node.kind() == "type_annotation" {
            node.named_child(0)?
        } else {
            node
        };
        let text = self.text(inner);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Whether a node has a direct anonymous child token with the given text
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| !c.is_named() && c.kind() == token);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST_CLASSES: &str = r#"
import { RestAPI } from "../decorators/rest-api";
import { RestMethod } from "../decorators/rest-method";

export class RestClass {
    public data = ["test", "test2", "test3"];

    public getData(count: number): any[] {
        return this.data;
    }
}

@RestAPI("")
export class RestClassWithExposedMethods {
    public data: string[] = ["test", "test2", "test3"];

    @RestMethod
    public getData(count?: number): any[] {
        return this.data.slice(0, count);
    }

    @RestMethod
    public storeItemOptional(item?: string, defaultValue: string = "test"): boolean {
        this.data.push(item);
        return true;
    }

    public nonRestMethod(): boolean {
        return false;
    }
}
"#;

    fn parse(text: &str) -> SourceFile {
        SourceParser::new().parse("fixtures/rest.ts", text).unwrap()
    }

    #[test]
    fn test_imports() {
        let file = parse(REST_CLASSES);
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].specifier, "../decorators/rest-api");
        assert_eq!(
            file.imports[0].bindings,
            vec![ImportBinding {
                imported: "RestAPI".to_string(),
                local: "RestAPI".to_string()
            }]
        );
        assert!(file.imports[0].is_relative());
    }

    #[test]
    fn test_class_decorators_and_members() {
        let file = parse(REST_CLASSES);
        assert_eq!(file.declarations.len(), 2);

        let plain = file.declaration("RestClass").unwrap();
        assert!(plain.decorators.is_empty());

        let api = file.declaration("RestClassWithExposedMethods").unwrap();
        assert!(api.exported);
        assert_eq!(api.decorator("RestAPI").unwrap().first_string_argument(), Some(String::new()));

        let methods: Vec<&Method> = api.methods().collect();
        assert_eq!(methods.len(), 3);
        assert!(methods[0].has_decorator("RestMethod"));
        assert!(methods[1].has_decorator("RestMethod"));
        assert!(!methods[2].has_decorator("RestMethod"));

        let property = api.properties().next().unwrap();
        assert_eq!(property.name, "data");
        assert_eq!(property.type_text.as_deref(), Some("string[]"));
    }

    #[test]
    fn test_parameters() {
        let file = parse(REST_CLASSES);
        let api = file.declaration("RestClassWithExposedMethods").unwrap();
        let store = api.methods().find(|m| m.name == "storeItemOptional").unwrap();

        assert_eq!(store.params.len(), 2);
        assert_eq!(store.params[0].name, "item");
        assert!(store.params[0].question);
        assert_eq!(store.params[1].name, "defaultValue");
        assert_eq!(store.params[1].default.as_deref(), Some("\"test\""));
        assert!(store.params.iter().all(Parameter::is_optional));
        assert_eq!(store.return_type.as_deref(), Some("boolean"));
    }

    #[test]
    fn test_rest_parameter_and_promise_return() {
        let file = parse(
            r#"
class Tags {
    async putTags(...tags: string[]): Promise<number> { return tags.length; }
}
"#,
        );
        let method = file.declarations[0].methods().next().unwrap();
        assert!(method.is_async);
        assert_eq!(method.params[0].name, "tags");
        assert!(method.params[0].rest);
        assert_eq!(method.return_type.as_deref(), Some("Promise<number>"));
    }

    #[test]
    fn test_interface_and_enum() {
        let file = parse(
            r#"
export interface User {
    id: number;
    role?: Role;
}

export enum Role { Admin, Member }
"#,
        );
        let user = file.declaration("User").unwrap();
        assert_eq!(user.kind, DeclarationKind::Interface);
        assert!(user.text.starts_with("interface User"));
        let props: Vec<&Property> = user.properties().collect();
        assert_eq!(props.len(), 2);
        assert!(props[1].optional);
        assert_eq!(props[1].type_text.as_deref(), Some("Role"));

        let role = file.declaration("Role").unwrap();
        assert_eq!(role.kind, DeclarationKind::Enum);
        assert_eq!(role.text, "enum Role { Admin, Member }");
    }

    #[test]
    fn test_aliased_import() {
        let file = parse(r#"import { User as Account, Role } from "./models";"#);
        let import = &file.imports[0];
        assert_eq!(import.binding_for("Account").unwrap().imported, "User");
        assert_eq!(import.binding_for("Role").unwrap().imported, "Role");
        assert!(import.binding_for("User").is_none());
    }

    #[test]
    fn test_invalid_source_is_parse_error() {
        let result = SourceParser::new().parse("broken.ts", "export class { ((");
        assert!(matches!(result, Err(RestgenError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = SourceParser::new().parse_file("does/not/exist.ts");
        assert!(matches!(result, Err(RestgenError::SourceNotFound(_))));
    }
}
