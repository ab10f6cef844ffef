//! Import Grouping
//!
//! Buckets import declarations by an ordered list of priority patterns and
//! renders each import statement from its structured form. Unused imports
//! are never pruned here; every import the processor receives is emitted.

use crate::extractor::declaration::{Declaration, ImportSpecifier};

/// Bucket index for a module specifier: the first pattern it equals or is
/// nested under wins; unmatched specifiers land in the trailing bucket
/// (`patterns.len()`).
pub fn bucket_index(source: &str, patterns: &[String]) -> usize {
    patterns
        .iter()
        .position(|p| {
            source == p.as_str()
                || source.starts_with(&format!("{}/", p))
                || source.starts_with(&format!("{}:", p))
        })
        .unwrap_or(patterns.len())
}

/// Render the whole import block: buckets in pattern order, stable within a
/// bucket, one blank line between non-empty buckets.
pub fn emit_import_block(imports: &[&Declaration], patterns: &[String]) -> String {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); patterns.len() + 1];
    for decl in imports {
        let idx = decl
            .source
            .as_deref()
            .map(|s| bucket_index(s, patterns))
            .unwrap_or(patterns.len());
        let mut rendered = String::new();
        for comment in &decl.leading_comments {
            rendered.push_str(comment);
            rendered.push('\n');
        }
        rendered.push_str(&render_import(decl));
        buckets[idx].push(rendered);
    }
    let blocks: Vec<String> = buckets
        .into_iter()
        .filter(|b| !b.is_empty())
        .map(|b| b.join("\n"))
        .collect();
    blocks.join("\n\n")
}

/// Render one import declaration.
pub fn render_import(decl: &Declaration) -> String {
    if decl.error.is_some() || decl.is_import_equals {
        return ensure_semicolon(decl.text.trim());
    }
    let source = decl
        .source_text
        .clone()
        .or_else(|| decl.source.as_ref().map(|s| format!("'{}'", s)))
        .unwrap_or_else(|| "''".to_string());
    if decl.is_side_effect {
        return format!("import {};", source);
    }
    let mut clauses: Vec<String> = Vec::new();
    if let Some(default_import) = &decl.default_import {
        clauses.push(default_import.clone());
    }
    if let Some(namespace) = &decl.namespace_import {
        clauses.push(format!("* as {}", namespace));
    }
    if !decl.specifiers.is_empty() {
        let names: Vec<String> = decl.specifiers.iter().map(render_specifier).collect();
        clauses.push(format!("{{ {} }}", names.join(", ")));
    }
    let type_kw = if decl.is_type_only { "type " } else { "" };
    format!("import {}{} from {};", type_kw, clauses.join(", "), source)
}

fn render_specifier(spec: &ImportSpecifier) -> String {
    let mut out = String::new();
    if spec.is_type {
        out.push_str("type ");
    }
    out.push_str(&spec.name);
    if let Some(alias) = &spec.alias {
        out.push_str(" as ");
        out.push_str(alias);
    }
    out
}

pub(crate) fn ensure_semicolon(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(';') || trimmed.ends_with('}') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::declaration::DeclarationKind;

    fn import(source: &str) -> Declaration {
        let mut decl = Declaration::new(DeclarationKind::Import, source);
        decl.source = Some(source.to_string());
        decl.source_text = Some(format!("'{}'", source));
        decl.specifiers = vec![ImportSpecifier::new("x")];
        decl
    }

    #[test]
    fn first_matching_pattern_wins() {
        let patterns = vec!["bun".to_string(), "node".to_string()];
        assert_eq!(bucket_index("bun", &patterns), 0);
        assert_eq!(bucket_index("bun:test", &patterns), 0);
        assert_eq!(bucket_index("node/fs", &patterns), 1);
        assert_eq!(bucket_index("./local", &patterns), 2);
        // Prefixes only match whole path segments.
        assert_eq!(bucket_index("bundler", &patterns), 2);
    }

    #[test]
    fn buckets_are_separated_by_one_blank_line() {
        let patterns = vec!["bun".to_string()];
        let a = import("bun");
        let b = import("./x");
        let block = emit_import_block(&[&a, &b], &patterns);
        assert_eq!(
            block,
            "import { x } from 'bun';\n\nimport { x } from './x';"
        );
    }

    #[test]
    fn renders_mixed_clauses() {
        let mut decl = import("./m");
        decl.default_import = Some("def".to_string());
        decl.specifiers = vec![
            ImportSpecifier::new("a").with_alias("b"),
            ImportSpecifier {
                name: "T".to_string(),
                alias: None,
                is_type: true,
            },
        ];
        assert_eq!(
            render_import(&decl),
            "import def, { a as b, type T } from './m';"
        );
    }
}
