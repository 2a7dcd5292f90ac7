//! @acp:module "Type References"
//! @acp:summary "Type names referenced by declarations and methods"
//! @acp:domain cli
//! @acp:layer analysis
//!
//! Type reference extraction

use crate::conventions::{is_primitive_token, type_tokens};
use crate::parse::{Declaration, Method};

/// Atomic type names referenced by a declaration's typed properties
///
/// Covers class fields and interface property signatures. Compound type
/// expressions are split into name tokens, de-duplicated in order of first
/// appearance. Primitives are kept; use [`referenced_types`] to drop them.
pub fn property_types(declaration: &Declaration) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    for property in declaration.properties() {
        let Some(type_text) = property.type_text.as_deref() else {
            continue;
        };
        for token in type_tokens(type_text) {
            if !types.contains(&token) {
                types.push(token);
            }
        }
    }
    types
}

/// Non-primitive names referenced by a declaration's properties
pub fn referenced_types(declaration: &Declaration) -> Vec<String> {
    property_types(declaration)
        .into_iter()
        .filter(|t| !is_primitive_token(t))
        .collect()
}

/// Non-primitive names referenced by a method's parameters and return type
///
/// The return type is read after unwrapping `Promise<T>`.
pub fn method_referenced_types(method: &Method) -> Vec<String> {
    let mut types: Vec<String> = Vec::new();
    let return_type = method
        .return_type
        .as_deref()
        .map(crate::conventions::unwrap_async_type);
    let sources = return_type
        .into_iter()
        .chain(method.params.iter().filter_map(|p| p.type_text.as_deref()));

    for type_text in sources {
        for token in type_tokens(type_text) {
            if !is_primitive_token(&token) && !types.contains(&token) {
                types.push(token);
            }
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SourceParser;

    fn declaration(text: &str, name: &str) -> Declaration {
        SourceParser::new()
            .parse("types.ts", text)
            .unwrap()
            .declaration(name)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_property_types_order_and_dedup() {
        let decl = declaration(
            r#"
class Order {
    id: number;
    lines: OrderLine[];
    customer: Customer;
    backup: Customer;
    tags: Map<string, Tag>;
    untyped = 3;
}
"#,
            "Order",
        );
        assert_eq!(
            property_types(&decl),
            vec!["number", "OrderLine", "Customer", "Map", "string", "Tag"]
        );
        assert_eq!(referenced_types(&decl), vec!["OrderLine", "Customer", "Map", "Tag"]);
    }

    #[test]
    fn test_method_referenced_types() {
        let decl = declaration(
            r#"
class Api {
    async saveOrder(order: Order, note?: string): Promise<Receipt[]> { return []; }
}
"#,
            "Api",
        );
        let method = decl.methods().next().unwrap();
        assert_eq!(method_referenced_types(method), vec!["Receipt", "Order"]);
    }
}
