/**
 * Scanner Tests
 *
 * Span production, statement boundary detection, lexical-mode opacity and
 * recovery from unterminated tokens.
 */

#[cfg(test)]
mod tests {
    use dts_compiler::error::UnterminatedKind;
    use dts_compiler::scanner::{scan, statements, SpanKind};

    fn statement_texts(source: &str) -> Vec<String> {
        scan(source)
            .spans
            .iter()
            .filter(|s| s.kind == SpanKind::Statement)
            .map(|s| s.text(source).to_string())
            .collect()
    }

    fn expect_statements(source: &str, expected: &[&str]) {
        let texts = statement_texts(source);
        assert_eq!(texts, expected, "statements for {:?}", source);
    }

    #[test]
    fn should_split_semicolon_terminated_statements() {
        expect_statements(
            "const a = 1; const b = 2;",
            &["const a = 1;", "const b = 2;"],
        );
    }

    #[test]
    fn should_terminate_statements_at_newlines() {
        expect_statements(
            "const a = 1\nconst b = 2\n",
            &["const a = 1", "const b = 2"],
        );
    }

    #[test]
    fn should_keep_statements_open_after_operators() {
        let texts = statement_texts("const total = 1 +\n  2\nconst other = 3\n");
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("1 +"));
        assert!(texts[0].contains('2'));
    }

    #[test]
    fn should_keep_multiline_initializers_together() {
        let texts = statement_texts("const config = {\n  port: 3000,\n  host: 'x',\n}\nconst n = 1\n");
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("port"));
        assert!(texts[0].ends_with('}'));
    }

    #[test]
    fn should_end_block_statements_after_their_closing_brace() {
        expect_statements(
            "function f() { return 1 }\nconst a = 2\n",
            &["function f() { return 1 }", "const a = 2"],
        );
    }

    #[test]
    fn should_ignore_braces_inside_strings_and_templates() {
        let texts = statement_texts("const s = '}{'\nconst t = `x${ { y: 1 } }z`\nconst u = 1\n");
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn should_ignore_nested_template_expressions() {
        let texts = statement_texts("const t = `a${ `b${c}` }d`\nconst u = 2\n");
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("`a${"));
    }

    #[test]
    fn should_treat_regex_literals_as_opaque() {
        let texts = statement_texts("const re = /a\\/[)}{/]+/g; const b = 1;");
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn should_distinguish_division_from_regex() {
        expect_statements("const half = total / 2\nconst x = 1\n", &[
            "const half = total / 2",
            "const x = 1",
        ]);
    }

    #[test]
    fn should_record_byte_accurate_offsets() {
        let source = "const a = 1;\nexport const b = 'two';\n";
        for span in scan(source).spans {
            let text = span.text(source);
            assert_eq!(text, &source[span.start..span.end]);
        }
    }

    #[test]
    fn should_tag_directive_prologue() {
        let result = scan("'use strict';\nconst a = 1;\n");
        assert_eq!(result.spans[0].kind, SpanKind::Directive);
        assert_eq!(result.spans[1].kind, SpanKind::Statement);
    }

    #[test]
    fn should_not_tag_strings_after_code_as_directives() {
        let result = scan("const a = 1;\n'not a directive';\n");
        let kinds: Vec<SpanKind> = result.spans.iter().map(|s| s.kind).collect();
        assert!(!kinds[1..].contains(&SpanKind::Directive));
    }

    #[test]
    fn should_attach_adjacent_comments_to_the_next_statement() {
        let source = "// first\n// second\nconst a = 1;\n";
        let result = scan(source);
        let stmts = statements(source, &result, true);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].leading_comments, vec!["// first", "// second"]);
    }

    #[test]
    fn should_break_attachment_at_blank_lines() {
        let source = "// dangling\n\n// attached\nconst a = 1;\n";
        let stmts = statements(source, &scan(source), true);
        assert_eq!(stmts[0].leading_comments, vec!["// attached"]);
    }

    #[test]
    fn should_drop_comment_text_when_retention_is_off() {
        let source = "/** doc */\nconst a = 1;\n";
        let stmts = statements(source, &scan(source), false);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].leading_comments.is_empty());
    }

    #[test]
    fn should_report_unterminated_strings_and_recover() {
        let source = "const ok = 1;\nconst bad = 'oops";
        let result = scan(source);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, UnterminatedKind::String);
        let stmts = statements(source, &result, true);
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].text(source).contains("ok"));
    }

    #[test]
    fn should_report_unterminated_templates() {
        let result = scan("const t = `never ends");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, UnterminatedKind::Template);
    }

    #[test]
    fn should_report_unterminated_block_comments() {
        let result = scan("const a = 1;\n/* runs off");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, UnterminatedKind::Comment);
        let stmts = statements("const a = 1;\n/* runs off", &result, true);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn should_skip_shebang_lines() {
        let texts = statement_texts("#!/usr/bin/env bun\nconst a = 1\n");
        assert_eq!(texts, vec!["const a = 1"]);
    }

    #[test]
    fn should_produce_no_statements_for_comment_only_input() {
        let result = scan("// just\n/* comments */\n");
        assert!(result
            .spans
            .iter()
            .all(|s| s.kind != SpanKind::Statement));
    }

    #[test]
    fn should_hold_multiline_generics_open() {
        let texts = statement_texts("function pick<\n  T extends object\n>(value: T): T { return value }\nconst a = 1\n");
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("extends object"));
    }
}
