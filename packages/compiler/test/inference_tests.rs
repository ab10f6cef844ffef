/**
 * Inference Tests
 *
 * The narrowing/widening table exercised through extraction: unannotated
 * bindings, parameter defaults, return shapes and class member widening.
 */

#[cfg(test)]
mod tests {
    use dts_compiler::{extract, Declaration};

    fn first(source: &str) -> Declaration {
        let mut decls = extract(source, "test.ts", true).declarations;
        assert!(!decls.is_empty(), "no declarations for {:?}", source);
        decls.remove(0)
    }

    fn expect_type(source: &str, expected: &str) {
        let decl = first(source);
        assert_eq!(
            decl.type_annotation.as_deref(),
            Some(expected),
            "inferred type for {:?}",
            source
        );
    }

    #[test]
    fn should_narrow_const_string_literals() {
        expect_type("export const name = 'hello'", "'hello'");
    }

    #[test]
    fn should_widen_let_string_literals() {
        expect_type("export let name = 'hello'", "string");
    }

    #[test]
    fn should_narrow_negative_numbers_for_const() {
        expect_type("const sentinel = -1", "-1");
        expect_type("let counter = 42", "number");
    }

    #[test]
    fn should_handle_boolean_null_and_undefined() {
        expect_type("const flag = true", "true");
        expect_type("let flag = false", "boolean");
        expect_type("const nothing = null", "null");
        expect_type("let missing = undefined", "undefined");
    }

    #[test]
    fn should_recognize_alternate_numeric_bases() {
        expect_type("const mask = 0xff", "0xff");
        expect_type("let mask = 0b1010", "number");
        expect_type("const big = 9007199254740993n", "9007199254740993n");
        expect_type("let big = 10n", "bigint");
    }

    #[test]
    fn should_widen_array_elements_into_unions() {
        expect_type("const xs = [1, 2, 3]", "number[]");
        expect_type("const mixed = [1, 'two', true]", "(number | string | boolean)[]");
        expect_type("const empty = []", "unknown[]");
    }

    #[test]
    fn should_widen_object_properties() {
        expect_type(
            "const config = { port: 3000, host: 'localhost' }",
            "{ port: number; host: string }",
        );
    }

    #[test]
    fn should_narrow_as_const_deeply() {
        expect_type("const pair = [1, 'a'] as const", "readonly [1, 'a']");
        expect_type(
            "const theme = { color: 'red', nested: { depth: 1 } } as const",
            "{ readonly color: 'red'; readonly nested: { readonly depth: 1 } }",
        );
    }

    #[test]
    fn should_take_cast_types_verbatim() {
        expect_type("const config = load() as Config", "Config");
        expect_type("let config = load() as Config", "Config");
        expect_type(
            "const defaults = { a: 1 } satisfies Partial<Options>",
            "Partial<Options>",
        );
    }

    #[test]
    fn should_handle_template_literals() {
        expect_type("const greeting = `hello`", "`hello`");
        expect_type("let greeting = `hello`", "string");
        expect_type("const msg = `v${version}`", "string");
    }

    #[test]
    fn should_infer_constructor_types() {
        expect_type("const cache = new Map<string, number>()", "Map<string, number>");
        expect_type("let target = new URL('https://x')", "URL");
    }

    #[test]
    fn should_infer_regex_literals() {
        expect_type("const pattern = /ab+c/g", "RegExp");
    }

    #[test]
    fn should_synthesize_arrow_function_types() {
        expect_type("const double = (n: number) => n * 2", "(n: number) => void");
        expect_type(
            "const retry = async (times = 3) => run(times)",
            "(times?: number) => Promise<void>",
        );
    }

    #[test]
    fn should_synthesize_function_expression_types() {
        expect_type(
            "const handler = function (req: Request): Response { return respond(req) }",
            "(req: Request) => Response",
        );
    }

    #[test]
    fn should_fall_back_to_unknown() {
        expect_type("const result = computeThings()", "unknown");
        expect_type("let sum = a + b", "unknown");
    }

    #[test]
    fn should_infer_parameter_defaults_and_optionality() {
        let decl = first("export function greet(name = 'world', times = 1) {}");
        assert_eq!(decl.parameters[0].type_annotation.as_deref(), Some("string"));
        assert!(decl.parameters[0].optional);
        assert_eq!(decl.parameters[1].type_annotation.as_deref(), Some("number"));
    }

    #[test]
    fn should_give_unannotated_parameters_unknown() {
        let decl = first("export function log(message, ...rest) {}");
        assert_eq!(
            decl.parameters[0].type_annotation.as_deref(),
            Some("unknown")
        );
        assert_eq!(
            decl.parameters[1].type_annotation.as_deref(),
            Some("unknown[]")
        );
        assert!(decl.parameters[1].rest);
    }

    #[test]
    fn should_synthesize_return_shapes_from_prefixes() {
        assert_eq!(
            first("function f() {}").return_type.as_deref(),
            Some("void")
        );
        assert_eq!(
            first("async function f() {}").return_type.as_deref(),
            Some("Promise<void>")
        );
        assert_eq!(
            first("function* f() {}").return_type.as_deref(),
            Some("Generator<unknown, void, unknown>")
        );
        assert_eq!(
            first("async function* f() {}").return_type.as_deref(),
            Some("AsyncGenerator<unknown, void, unknown>")
        );
    }

    #[test]
    fn should_widen_instance_properties_but_narrow_static_readonly() {
        let decl = first(
            "class Config {\n  static readonly VERSION = '1.0'\n  retries = 3\n}",
        );
        assert_eq!(
            decl.members[0].type_annotation.as_deref(),
            Some("'1.0'"),
            "static readonly narrows"
        );
        assert_eq!(
            decl.members[1].type_annotation.as_deref(),
            Some("number"),
            "instance properties widen"
        );
    }

    #[test]
    fn should_mark_inferred_types() {
        assert!(first("const x = 1").type_inferred);
        assert!(!first("const x: number = 1").type_inferred);
    }
}
