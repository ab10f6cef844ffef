/**
 * Processor Tests
 *
 * Emission transforms: body elision, `declare` insertion, private member
 * filtering, parameter-property expansion, overload emission, import
 * grouping and comment placement.
 */

#[cfg(test)]
mod tests {
    use dts_compiler::{generate_from_source, GenerateOptions};

    fn generate(source: &str) -> String {
        generate_from_source(source, "test.ts", &GenerateOptions::default()).output
    }

    fn expect_output(source: &str, expected: &str) {
        assert_eq!(generate(source), expected, "output for {:?}", source);
    }

    fn expect_contains(source: &str, fragment: &str) {
        let output = generate(source);
        assert!(
            output.contains(fragment),
            "expected {:?} in output:\n{}",
            fragment,
            output
        );
    }

    fn expect_not_contains(source: &str, fragment: &str) {
        let output = generate(source);
        assert!(
            !output.contains(fragment),
            "did not expect {:?} in output:\n{}",
            fragment,
            output
        );
    }

    #[test]
    fn should_elide_function_bodies() {
        expect_output(
            "export function add(a: number, b: number) { return a + b }",
            "export declare function add(a: number, b: number): void;\n",
        );
    }

    #[test]
    fn should_narrow_exported_const_literals() {
        expect_output(
            "export const name = 'hello'",
            "export declare const name: 'hello';\n",
        );
    }

    #[test]
    fn should_widen_exported_let_literals() {
        expect_output(
            "export let name = 'hello'",
            "export declare let name: string;\n",
        );
    }

    #[test]
    fn should_drop_async_generator_prefixes_in_signatures() {
        expect_output(
            "export async function* s(urls: string[]) { for (const u of urls) yield await fetch(u) }",
            "export declare function s(urls: string[]): AsyncGenerator<unknown, void, unknown>;\n",
        );
    }

    #[test]
    fn should_expand_parameter_properties_and_hide_private_ones() {
        let source =
            "export class U { constructor(public readonly id: string, private secret: string) {} }";
        expect_contains(source, "public readonly id: string;");
        expect_contains(source, "constructor(id: string, secret: string);");
        expect_not_contains(source, "private secret");
        expect_not_contains(source, "secret: string;\n");
    }

    #[test]
    fn should_emit_overload_signatures_without_the_implementation() {
        let output = generate(
            "export function p(x: string): string; export function p(x: number): number; export function p(x: any): any { return x }",
        );
        assert_eq!(
            output,
            "export declare function p(x: string): string;\nexport declare function p(x: number): number;\n"
        );
    }

    #[test]
    fn should_order_imports_by_priority_patterns() {
        let output = generate("import { a } from 'bun'; import { b } from './x'");
        assert_eq!(
            output,
            "import { a } from 'bun';\n\nimport { b } from './x';\n"
        );
    }

    #[test]
    fn should_respect_custom_import_order() {
        let options = GenerateOptions::default().with_import_order(["node", "bun"]);
        let output = generate_from_source(
            "import { a } from 'bun'\nimport { f } from 'node:fs'\n",
            "test.ts",
            &options,
        )
        .output;
        assert_eq!(
            output,
            "import { f } from 'node:fs';\n\nimport { a } from 'bun';\n"
        );
    }

    #[test]
    fn should_preserve_every_import() {
        let output = generate(
            "import def from './a'\nimport * as ns from './b'\nimport type { T } from './c'\nimport './polyfill'\n",
        );
        assert!(output.contains("import def from './a';"));
        assert!(output.contains("import * as ns from './b';"));
        assert!(output.contains("import type { T } from './c';"));
        assert!(output.contains("import './polyfill';"));
    }

    #[test]
    fn should_drop_private_class_members() {
        let source = "export class Store {\n  private cache = new Map()\n  #hidden = 1\n  size = 0\n}";
        expect_not_contains(source, "cache");
        expect_not_contains(source, "#hidden");
        expect_contains(source, "size: number;");
    }

    #[test]
    fn should_render_accessors_as_signatures() {
        let source = "export class Box {\n  get value(): number { return 1 }\n  set value(v: number) { }\n}";
        expect_contains(source, "get value(): number;");
        expect_contains(source, "set value(v: number);");
    }

    #[test]
    fn should_drop_parameter_defaults_in_favor_of_optional() {
        expect_output(
            "export function greet(name = 'world') { return name }",
            "export declare function greet(name?: string): void;\n",
        );
    }

    #[test]
    fn should_preserve_enums_verbatim() {
        expect_output(
            "export enum Direction { Up = 'up', Down = 'down' }",
            "export declare enum Direction { Up = 'up', Down = 'down' }\n",
        );
        expect_output(
            "export const enum Level { Low, High }",
            "export declare const enum Level { Low, High }\n",
        );
    }

    #[test]
    fn should_insert_declare_for_interfaces_and_aliases() {
        expect_output(
            "export interface Point { x: number; y: number }",
            "export declare interface Point { x: number; y: number }\n",
        );
        expect_output(
            "export type ID = string | number",
            "export declare type ID = string | number;\n",
        );
    }

    #[test]
    fn should_declare_non_exported_top_level_declarations() {
        expect_output("function helper() {}", "declare function helper(): void;\n");
        expect_output("const LIMIT = 10", "declare const LIMIT: 10;\n");
    }

    #[test]
    fn should_recurse_into_namespaces_without_inner_declare() {
        expect_output(
            "export namespace Util {\n  export function log(msg: string) { console.log(msg) }\n  export const LEVEL = 'info'\n}",
            "export declare namespace Util {\n  export function log(msg: string): void;\n  export const LEVEL: 'info';\n}\n",
        );
    }

    #[test]
    fn should_keep_ambient_module_blocks() {
        let output = generate("declare module 'some-lib' {\n  export const x: number\n}");
        assert_eq!(
            output,
            "declare module 'some-lib' {\n  export const x: number;\n}\n"
        );
    }

    #[test]
    fn should_emit_leading_comments_before_their_declaration() {
        let output = generate("/** The port. */\nexport const port = 3000\n");
        assert_eq!(
            output,
            "/** The port. */\nexport declare const port: 3000;\n"
        );
    }

    #[test]
    fn should_separate_comment_blocks_with_one_blank_line() {
        let output = generate(
            "export const a = 1\n// about b\nexport const b = 2\n",
        );
        assert_eq!(
            output,
            "export declare const a: 1;\n\n// about b\nexport declare const b: 2;\n"
        );
    }

    #[test]
    fn should_drop_comments_when_retention_is_off() {
        let options = GenerateOptions::default().without_comments();
        let output =
            generate_from_source("/** doc */\nexport const a = 1\n", "test.ts", &options).output;
        assert_eq!(output, "export declare const a: 1;\n");
    }

    #[test]
    fn should_pass_reexports_through() {
        expect_output(
            "export { a, b as c } from './other'",
            "export { a, b as c } from './other';\n",
        );
        expect_output("export * from './all'", "export * from './all';\n");
    }

    #[test]
    fn should_emit_fallback_text_for_unparseable_headers() {
        let output = generate("export function broken(a: string { return a }");
        assert!(output.contains("broken"));
        assert!(output.starts_with("export declare"));
    }

    #[test]
    fn should_keep_import_equals_verbatim() {
        expect_output(
            "import legacy = require('legacy-lib')",
            "import legacy = require('legacy-lib');\n",
        );
    }

    #[test]
    fn should_emit_abstract_classes() {
        let source = "export abstract class Shape {\n  abstract area(): number\n  name = 'shape'\n}";
        expect_contains(source, "export declare abstract class Shape {");
        expect_contains(source, "abstract area(): number;");
        expect_contains(source, "name: string;");
    }

    #[test]
    fn should_keep_static_modifiers_on_members() {
        let source = "export class Config {\n  static readonly VERSION = '1.0'\n}";
        expect_contains(source, "static readonly VERSION: '1.0';");
    }
}
