/**
 * Extractor Tests
 *
 * Statement classification, header parsing, member recursion and overload
 * grouping over the structured Declaration form.
 */

#[cfg(test)]
mod tests {
    use dts_compiler::{
        extract, Declaration, DeclarationKind, DiagnosticCode, Modifiers, VarKind, Visibility,
    };

    fn extract_all(source: &str) -> Vec<Declaration> {
        extract(source, "test.ts", true).declarations
    }

    fn extract_one(source: &str) -> Declaration {
        let mut decls = extract_all(source);
        assert_eq!(decls.len(), 1, "expected one declaration for {:?}", source);
        decls.remove(0)
    }

    fn expect_kind(decl: &Declaration, kind: DeclarationKind) {
        assert_eq!(decl.kind, kind, "kind of `{}`", decl.name);
    }

    #[test]
    fn should_classify_exported_functions() {
        let decl = extract_one("export function add(a: number, b: number) { return a + b }");
        expect_kind(&decl, DeclarationKind::Function);
        assert_eq!(decl.name, "add");
        assert!(decl.is_exported);
        assert!(decl.has_body);
        assert_eq!(decl.parameters.len(), 2);
        assert_eq!(decl.parameters[0].type_annotation.as_deref(), Some("number"));
        assert_eq!(decl.return_type.as_deref(), Some("void"));
    }

    #[test]
    fn should_capture_generics_with_constraints() {
        let decl = extract_one("export function pick<T, K extends keyof T>(obj: T, key: K): T[K] { return obj[key] }");
        assert_eq!(decl.generics.as_deref(), Some("<T, K extends keyof T>"));
        assert_eq!(decl.return_type.as_deref(), Some("T[K]"));
    }

    #[test]
    fn should_record_async_and_generator_prefixes() {
        let decl = extract_one("export async function* stream(urls: string[]) { yield 1 }");
        assert!(decl.is_async);
        assert!(decl.is_generator);
        assert_eq!(
            decl.return_type.as_deref(),
            Some("AsyncGenerator<unknown, void, unknown>")
        );
    }

    #[test]
    fn should_expand_multiple_bindings_into_declarations() {
        let decls = extract_all("const a = 1, b: string = 'x';");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "a");
        assert_eq!(decls[0].binding, Some(VarKind::Const));
        assert_eq!(decls[1].type_annotation.as_deref(), Some("string"));
    }

    #[test]
    fn should_share_leading_comments_across_split_bindings() {
        let decls = extract_all("// pair\nconst a = 1, b = 2;");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].leading_comments, vec!["// pair"]);
        assert_eq!(decls[1].leading_comments, vec!["// pair"]);
    }

    #[test]
    fn should_mark_declare_statements_as_ambient() {
        let decl = extract_one("declare const VERSION: string;");
        assert!(decl.modifiers.contains(Modifiers::DECLARE));
        assert_eq!(decl.type_annotation.as_deref(), Some("string"));
    }

    #[test]
    fn should_parse_class_heads_and_members() {
        let decl = extract_one(
            "export class Service<T> extends Base<T> implements Checkable {\n  ready = false\n  start(): void {}\n}",
        );
        expect_kind(&decl, DeclarationKind::Class);
        assert_eq!(decl.extends.as_deref(), Some("Base<T>"));
        assert_eq!(decl.implements, vec!["Checkable".to_string()]);
        assert_eq!(decl.members.len(), 2);
        assert_eq!(decl.members[0].name, "ready");
        assert_eq!(decl.members[0].type_annotation.as_deref(), Some("boolean"));
        assert_eq!(decl.members[1].name, "start");
        expect_kind(&decl.members[1], DeclarationKind::Function);
    }

    #[test]
    fn should_capture_constructor_parameter_properties() {
        let decl = extract_one(
            "export class U { constructor(public readonly id: string, private secret: string) {} }",
        );
        let ctor = &decl.members[0];
        assert_eq!(ctor.name, "constructor");
        assert_eq!(ctor.parameters[0].visibility, Some(Visibility::Public));
        assert!(ctor.parameters[0].readonly);
        assert_eq!(ctor.parameters[1].visibility, Some(Visibility::Private));
    }

    #[test]
    fn should_flag_private_members() {
        let decl = extract_one(
            "class Store {\n  private cache = new Map()\n  #secret = 1\n  put(k: string) {}\n}",
        );
        assert!(decl.members[0].is_private());
        assert!(decl.members[1].is_private());
        assert!(!decl.members[2].is_private());
    }

    #[test]
    fn should_recurse_into_namespaces() {
        let decl = extract_one(
            "export namespace Util {\n  export function log(msg: string) {}\n  export const LEVEL = 'info'\n}",
        );
        expect_kind(&decl, DeclarationKind::Namespace);
        assert_eq!(decl.members.len(), 2);
        expect_kind(&decl.members[0], DeclarationKind::Function);
        assert_eq!(decl.members[1].type_annotation.as_deref(), Some("'info'"));
    }

    #[test]
    fn should_parse_quoted_module_names() {
        let decl = extract_one("declare module 'some-lib' {\n  export const x: number\n}");
        expect_kind(&decl, DeclarationKind::Module);
        assert_eq!(decl.name, "'some-lib'");
        assert_eq!(decl.members.len(), 1);
    }

    #[test]
    fn should_parse_type_aliases() {
        let decl = extract_one("export type ID = string | number;");
        expect_kind(&decl, DeclarationKind::Type);
        assert_eq!(decl.name, "ID");
        assert_eq!(decl.type_annotation.as_deref(), Some("string | number"));
    }

    #[test]
    fn should_parse_interfaces_with_members() {
        let decl = extract_one(
            "export interface Handler {\n  handle(req: Request): Response;\n  readonly name: string;\n}",
        );
        expect_kind(&decl, DeclarationKind::Interface);
        assert_eq!(decl.members.len(), 2);
        expect_kind(&decl.members[0], DeclarationKind::Function);
        assert!(decl.members[1].modifiers.contains(Modifiers::READONLY));
    }

    #[test]
    fn should_parse_enums_and_their_cases() {
        let decl = extract_one("export enum Direction { Up = 'up', Down = 'down' }");
        expect_kind(&decl, DeclarationKind::Enum);
        assert_eq!(decl.members.len(), 2);
        assert_eq!(decl.members[0].name, "Up");
    }

    #[test]
    fn should_parse_import_clauses() {
        let decl = extract_one("import def, { a as b, type C } from './mod'");
        expect_kind(&decl, DeclarationKind::Import);
        assert_eq!(decl.name, "./mod");
        assert_eq!(decl.default_import.as_deref(), Some("def"));
        assert_eq!(decl.specifiers.len(), 2);
        assert_eq!(decl.specifiers[0].alias.as_deref(), Some("b"));
        assert!(decl.specifiers[1].is_type);
    }

    #[test]
    fn should_mark_type_only_and_side_effect_imports() {
        let decls = extract_all("import type { Config } from './config'\nimport 'polyfill'\n");
        assert!(decls[0].is_type_only);
        assert!(!decls[0].is_side_effect);
        assert!(decls[1].is_side_effect);
        assert!(!decls[1].is_type_only);
    }

    #[test]
    fn should_parse_reexport_clauses() {
        let decl = extract_one("export { a, b as c } from './other'");
        expect_kind(&decl, DeclarationKind::Export);
        assert_eq!(decl.source.as_deref(), Some("./other"));
        assert_eq!(decl.specifiers.len(), 2);
        assert_eq!(decl.specifiers[1].alias.as_deref(), Some("c"));
    }

    #[test]
    fn should_group_overloads_in_source_order() {
        let decls = extract_all(
            "export function p(x: string): string;\nexport function p(x: number): number;\nexport function p(x: any): any { return x }\n",
        );
        assert_eq!(decls.len(), 1);
        let group = &decls[0];
        assert_eq!(group.overloads.len(), 3);
        assert!(group.overloads[0].contains("x: string"));
        assert!(group.overloads[2].ends_with(';'));
        assert_eq!(group.overload_bodies, vec![false, false, true]);
    }

    #[test]
    fn should_skip_side_effect_statements() {
        let decls = extract_all("console.log('boot');\nstartServer();\n");
        assert!(decls.is_empty());
    }

    #[test]
    fn should_skip_leading_decorators() {
        let decl = extract_one("@injectable()\n@scope('request')\nexport class Worker { run() {} }");
        expect_kind(&decl, DeclarationKind::Class);
        assert_eq!(decl.name, "Worker");
        assert!(!decl.text.contains('@'));
    }

    #[test]
    fn should_emit_extraction_errors_for_unbalanced_headers() {
        let result = extract("export function broken(a: string { return a }", "bad.ts", true);
        assert_eq!(result.declarations.len(), 1);
        assert!(result.declarations[0].error.is_some());
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::ExtractionError));
    }

    #[test]
    fn should_surface_parse_errors_with_locations() {
        let result = extract("const a = 1;\nconst b = 'x", "bad.ts", true);
        let parse_errors: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::ParseError)
            .collect();
        assert_eq!(parse_errors.len(), 1);
        let location = parse_errors[0].location.expect("location");
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 11);
        assert_eq!(parse_errors[0].file, "bad.ts");
        // The declaration before the failure survives.
        assert_eq!(result.declarations.len(), 1);
        assert_eq!(result.declarations[0].name, "a");
    }

    #[test]
    fn should_keep_import_equals_forms() {
        let decl = extract_one("import legacy = require('legacy-lib')");
        expect_kind(&decl, DeclarationKind::Import);
        assert!(decl.is_import_equals);
        assert_eq!(decl.source.as_deref(), Some("legacy-lib"));
    }

    #[test]
    fn should_capture_getters_and_setters() {
        let decl = extract_one(
            "class Box {\n  get value(): number { return 1 }\n  set value(v: number) {}\n}",
        );
        assert_eq!(decl.members.len(), 2);
        assert!(decl.members[0].accessor.is_some());
        assert_eq!(decl.members[0].return_type.as_deref(), Some("number"));
        assert!(decl.members[1].accessor.is_some());
    }
}
