//! Stub emitter integration tests
//!
//! Each test lays out a small TypeScript project in a temp dir and generates
//! a client for its API class.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use pretty_assertions::assert_eq;
use serde_json::Value;

use restgen::emit::ClientFlavor;
use restgen::{
    ApiObject, Args, DeclarationId, Dispatcher, EmitSettings, MethodSignature, ParamType,
    Registry, RestgenError, SourceParser, StubEmitter, Verb,
};

const SHOP_API: &str = r#"import { RestAPI, RestMethod } from "restgen-decorators";
import { Order } from "./models/order";
import { Customer } from "./models/customer";

@RestAPI("API/v1")
export class ShopApi {
    private items: any[] = ["item1", "item2"];

    @RestMethod
    public getItems(): any[] {
        return this.items;
    }

    @RestMethod
    public storeItem(item: string, note?: string): boolean {
        this.items.push(item);
        return true;
    }

    @RestMethod
    public async placeOrder(order: Order): Promise<Receipt> {
        return { id: 1, total: 0 };
    }

    @RestMethod
    public async getCustomer(id: number): Promise<Customer> {
        return null;
    }

    public helper(): void {}
}

export class Receipt {
    id: number;
    total: number;
}
"#;

const ORDER: &str = r#"import { Customer } from "./customer";

export interface Order {
    customer: Customer;
    lines: OrderLine[];
}

export class OrderLine {
    sku: string;
    qty: number;
}
"#;

const CUSTOMER: &str = r#"export interface Customer {
    id: number;
    name: string;
    referrer?: Customer;
}"#;

fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

fn shop_project(dir: &Path) -> PathBuf {
    write(dir, "models/order.ts", ORDER);
    write(dir, "models/customer.ts", CUSTOMER);
    write(dir, "shop.ts", SHOP_API)
}

fn emitter(embed: bool) -> StubEmitter {
    StubEmitter::new(EmitSettings {
        embed_interfaces: embed,
        ..EmitSettings::default()
    })
}

// =============================================================================
// Operations
// =============================================================================

mod operation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_marked_methods_become_operations() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());

        let api = emitter(true).describe(&source).unwrap();
        assert_eq!(api.class_name, "ShopApi");
        assert_eq!(api.prefix, "API/v1");
        let table: Vec<(&str, Verb, &str)> = api
            .operations
            .iter()
            .map(|op| (op.name.as_str(), op.verb, op.path.as_str()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("getItems", Verb::Get, "API/v1/get-items"),
                ("storeItem", Verb::Get, "API/v1/store-item"),
                ("placeOrder", Verb::Post, "API/v1/place-order"),
                ("getCustomer", Verb::Get, "API/v1/get-customer"),
            ]
        );
    }

    #[test]
    fn test_method_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let text = emitter(true).emit(&source, &dir.path().join("out/shop.service.ts")).unwrap();

        assert!(text.contains("export class ShopApiService {"));
        assert!(text.contains("serverUrl = window.location.protocol + '//' + window.location.host;"));
        assert!(text.contains(
            "public async storeItem(item: string, note?: string): Promise<boolean> {\n        return this.request(\"API/v1/store-item\", \"get\", { item: item, note: note }, undefined);"
        ));
        assert!(text.contains(
            "public async placeOrder(order: Order): Promise<Receipt> {\n        return this.request(\"API/v1/place-order\", \"post\", undefined, { order: order });"
        ));
        assert!(text.contains("public async getItems(): Promise<any[]>"));
        assert!(!text.contains("helper"));
        assert_eq!(text.matches("public async request(").count(), 1);
    }

    #[test]
    fn test_missing_api_class() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(dir.path(), "plain.ts", "export class RestClass { getData(count: number): any[] { return []; } }");
        let err = emitter(true).emit(&source, &dir.path().join("out.ts")).unwrap_err();
        assert!(matches!(err, RestgenError::MissingDeclaration { .. }));
    }

    #[test]
    fn test_class_filter() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(
            dir.path(),
            "two.ts",
            r#"@RestAPI("a") export class First { @RestMethod getOne(): number { return 1; } }
@RestAPI("b") export class Second { @RestMethod getTwo(): number { return 2; } }"#,
        );
        let settings = EmitSettings {
            class_name: Some("Second".to_string()),
            ..EmitSettings::default()
        };
        let api = StubEmitter::new(settings.clone()).describe(&source).unwrap();
        assert_eq!(api.operations[0].path, "b/get-two");

        let missing = StubEmitter::new(EmitSettings {
            class_name: Some("Third".to_string()),
            ..settings
        })
        .describe(&source)
        .unwrap_err();
        assert!(matches!(missing, RestgenError::MissingDeclaration { class_name: Some(_), .. }));
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = emitter(true)
            .emit(&dir.path().join("nope.ts"), &dir.path().join("out.ts"))
            .unwrap_err();
        assert!(matches!(err, RestgenError::SourceNotFound(_)));
    }
}

// =============================================================================
// Embed vs import
// =============================================================================

mod reference_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_graph_dependencies_first() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let generated = emitter(true)
            .generate(&source, &dir.path().join("out/shop.service.ts"), &Registry::new())
            .unwrap();

        assert_eq!(generated.referenced, vec!["Receipt", "Customer", "OrderLine", "Order"]);
        let text = &generated.text;
        assert!(text.starts_with("interface Receipt {\n\tid: number;\n\ttotal: number;\n}\n\n"));
        assert_eq!(text.matches("interface Customer {").count(), 1);
        let customer_at = text.find("interface Customer {").unwrap();
        let order_at = text.find("interface Order {").unwrap();
        let service_at = text.find("export class ShopApiService").unwrap();
        assert!(customer_at < order_at && order_at < service_at);
        assert!(text.contains("interface OrderLine {\n\tsku: string;\n\tqty: number;\n}"));
        assert!(!text.contains("import {"));
    }

    #[test]
    fn test_import_statements_grouped_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let text = emitter(false)
            .emit(&source, &dir.path().join("client/shop.service.ts"))
            .unwrap();

        let expected_header = concat!(
            "import { Receipt } from \"../shop\";\n",
            "import { Order } from \"../models/order\";\n",
            "import { Customer } from \"../models/customer\";\n",
            "\n",
            "export class ShopApiService {",
        );
        assert!(text.starts_with(expected_header), "got:\n{}", text);
        assert!(!text.contains("interface Customer"));
    }

    #[test]
    fn test_types_from_one_file_share_an_import() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "models.ts",
            "export interface Item { id: number; }\nexport interface Page { items: Item[]; }",
        );
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { Item, Page } from "./models";
@RestAPI("") export class Catalog {
    @RestMethod getPage(): Page { return null; }
    @RestMethod postItem(item: Item): Item { return item; }
}"#,
        );
        let text = emitter(false).emit(&source, &dir.path().join("api.service.ts")).unwrap();
        assert!(text.starts_with("import { Page, Item } from \"./models\";\n"));
        assert_eq!(text.matches("import {").count(), 1);
    }

    #[test]
    fn test_unresolvable_types_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { Observable } from "rxjs";
@RestAPI("") export class Clock {
    @RestMethod getNow(): Date { return new Date(); }
    @RestMethod getTicks(): Observable<number> { return null; }
}"#,
        );
        let generated = emitter(true)
            .generate(&source, &dir.path().join("out.ts"), &Registry::new())
            .unwrap();
        assert!(generated.referenced.is_empty());
        assert!(generated.text.starts_with("export class ClockService {"));
    }

    #[test]
    fn test_cyclic_files_terminate() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "author.ts",
            r#"import { Book } from "./book";
export interface Author { name: string; books: Book[]; }"#,
        );
        write(
            dir.path(),
            "book.ts",
            r#"import { Author } from "./author";
export interface Book { title: string; author: Author; sequel?: Book; }"#,
        );
        let source = write(
            dir.path(),
            "library.ts",
            r#"import { Author } from "./author";
import { Book } from "./book";
@RestAPI("lib") export class Library {
    @RestMethod getAuthor(name: string): Author { return null; }
    @RestMethod getBook(title: string): Book { return null; }
}"#,
        );
        let generated = emitter(true)
            .generate(&source, &dir.path().join("out.ts"), &Registry::new())
            .unwrap();
        assert_eq!(generated.referenced, vec!["Book", "Author"]);
        assert_eq!(generated.text.matches("interface Book {").count(), 1);
        assert_eq!(generated.text.matches("interface Author {").count(), 1);
    }

    #[test]
    fn test_renamed_import_embeds_alias() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "user.ts", "export interface User { id: number; }");
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { User as Account } from "./user";
@RestAPI("") export class Accounts {
    @RestMethod getAccount(id: number): Account { return null; }
}"#,
        );
        let generated = emitter(true)
            .generate(&source, &dir.path().join("out.ts"), &Registry::new())
            .unwrap();

        assert_eq!(generated.referenced, vec!["User", "Account"]);
        assert!(generated
            .text
            .starts_with("interface User { id: number; }\n\ntype Account = User;\n\nexport class AccountsService {"));
        assert!(generated.text.contains("public async getAccount(id: number): Promise<Account> {"));
    }

    #[test]
    fn test_renamed_import_keeps_binding_in_import_mode() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "user.ts", "export interface User { id: number; }");
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { User as Account } from "./user";
@RestAPI("") export class Accounts {
    @RestMethod getAccount(id: number): Account { return null; }
}"#,
        );
        let text = emitter(false).emit(&source, &dir.path().join("out.ts")).unwrap();
        assert!(text.starts_with("import { User as Account } from \"./user\";\n"));
        assert!(!text.contains("type Account"));
    }

    #[test]
    fn test_declaration_file_import_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "types/user.d.ts", "export interface User { id: number; }");
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { User } from "./types/user";
@RestAPI("") export class Users {
    @RestMethod getUser(id: number): User { return null; }
}"#,
        );
        let embedded = emitter(true)
            .generate(&source, &dir.path().join("out.ts"), &Registry::new())
            .unwrap();
        assert_eq!(embedded.referenced, vec!["User"]);

        let imported = emitter(false).emit(&source, &dir.path().join("client/out.ts")).unwrap();
        assert!(imported.starts_with("import { User } from \"../types/user\";\n"));
    }

    #[test]
    fn test_missing_import_target_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = write(
            dir.path(),
            "api.ts",
            r#"import { User } from "./nowhere";
@RestAPI("") export class Users {
    @RestMethod getUser(id: number): User { return null; }
}"#,
        );
        let generated = emitter(true)
            .generate(&source, &dir.path().join("out.ts"), &Registry::new())
            .unwrap();
        assert!(generated.referenced.is_empty());
        assert!(generated.text.starts_with("export class UsersService {"));
    }
}

// =============================================================================
// Output
// =============================================================================

mod output_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_angular_flavor() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let settings = EmitSettings {
            flavor: ClientFlavor::Angular,
            embed_interfaces: false,
            ..EmitSettings::default()
        };
        let text = StubEmitter::new(settings)
            .emit(&source, &dir.path().join("shop.service.ts"))
            .unwrap();
        assert!(text.starts_with("import { Injectable } from '@angular/core';\nimport { Receipt } from \"./shop\";\n"));
        assert!(text.contains("@Injectable({providedIn: 'root'})\nexport class ShopApiService {"));
    }

    #[test]
    fn test_generate_to_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let output = dir.path().join("generated/client/shop.service.ts");

        let generated = emitter(true).generate_to_file(&source, &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), generated.text);
        assert_eq!(generated.api.operations.len(), 4);
    }

    #[test]
    fn test_runtime_arity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());
        let mut runtime = Registry::new();
        runtime.api("ShopApi", "API/v1").operation("storeItem", [ParamType::String]);

        let err = emitter(true)
            .emit_with_registry(&source, &dir.path().join("out.ts"), &runtime)
            .unwrap_err();
        assert!(matches!(err, RestgenError::ArityMismatch { types: 1, names: 2, .. }));
    }
}

// =============================================================================
// Client and server agreement
// =============================================================================

mod agreement_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Live object whose method list comes from the parsed class
    struct ParsedApi {
        name: String,
        methods: Vec<MethodSignature>,
    }

    impl ApiObject for ParsedApi {
        fn declaration(&self) -> DeclarationId {
            DeclarationId::new(self.name.as_str())
        }

        fn methods(&self) -> Vec<MethodSignature> {
            self.methods.clone()
        }

        fn invoke<'a>(&'a self, _method: &'a str, _args: Args) -> BoxFuture<'a, anyhow::Result<Value>> {
            Box::pin(async { Ok(Value::Null) })
        }
    }

    #[test]
    fn test_stub_and_dispatcher_derive_identical_routes() {
        let dir = tempfile::tempdir().unwrap();
        let source = shop_project(dir.path());

        let file = SourceParser::new().parse_file(&source).unwrap();
        let class = file.declaration("ShopApi").unwrap();

        // Runtime side: registry from decorators plus per-parameter type tags
        let mut registry = Registry::new();
        assert!(registry.record_source_declaration(class, "RestAPI", "RestMethod"));
        for method in class.methods() {
            let types = method
                .params
                .iter()
                .map(|p| ParamType::from_type_text(p.type_or_any()))
                .collect();
            registry.declare_param_types(class.name.as_str(), &method.name, types);
        }
        let object = Arc::new(ParsedApi {
            name: class.name.clone(),
            methods: class
                .methods()
                .map(|m| MethodSignature::new(m.name.as_str(), m.params.iter().map(|p| p.name.as_str())))
                .collect(),
        });
        let bound = Dispatcher::build(&registry, object).unwrap();
        let server: Vec<(Verb, String)> = bound.routes().iter().map(|r| (r.verb, r.path.clone())).collect();

        let generated = emitter(false)
            .generate(&source, &dir.path().join("out.ts"), &registry)
            .unwrap();
        let client: Vec<(Verb, String)> = generated
            .api
            .operations
            .iter()
            .map(|op| (op.verb, op.path.clone()))
            .collect();

        assert_eq!(client, server);
        assert_eq!(client.len(), 4);
    }
}
