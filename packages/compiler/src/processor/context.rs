//! Processing Context
//!
//! The processor's per-invocation workspace: the declaration list plus
//! bookkeeping maps with deterministic iteration order. One context lives
//! for exactly one processor run and is never shared across files.

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractor::declaration::Declaration;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

// Type-position words that are not referenceable names.
const TYPE_KEYWORDS: &[&str] = &[
    "string", "number", "boolean", "void", "unknown", "any", "never", "null", "undefined",
    "object", "symbol", "bigint", "this", "true", "false", "readonly", "keyof", "typeof",
    "infer", "extends", "implements", "in", "out", "is", "asserts", "new", "const",
];

/// Mutable workspace for one processor invocation.
#[derive(Debug)]
pub struct ProcessingContext {
    pub declarations: Vec<Declaration>,
    /// Module specifier → identifiers bound from it.
    pub imports_by_module: IndexMap<String, IndexSet<String>>,
    pub exported_names: IndexSet<String>,
    pub referenced_types: IndexSet<String>,
}

impl ProcessingContext {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        let mut context = ProcessingContext {
            declarations: Vec::new(),
            imports_by_module: IndexMap::new(),
            exported_names: IndexSet::new(),
            referenced_types: IndexSet::new(),
        };
        for decl in &declarations {
            context.record(decl);
        }
        context.declarations = declarations;
        context
    }

    fn record(&mut self, decl: &Declaration) {
        if decl.is_import() {
            if let Some(source) = &decl.source {
                let bindings = self.imports_by_module.entry(source.clone()).or_default();
                if let Some(default_import) = &decl.default_import {
                    bindings.insert(default_import.clone());
                }
                if let Some(namespace) = &decl.namespace_import {
                    bindings.insert(namespace.clone());
                }
                for spec in &decl.specifiers {
                    bindings.insert(spec.local_name().to_string());
                }
            }
            return;
        }
        if decl.is_exported && !decl.name.is_empty() {
            self.exported_names.insert(decl.name.clone());
        }
        self.collect_type_names(decl);
    }

    fn collect_type_names(&mut self, decl: &Declaration) {
        let mut texts: Vec<&str> = Vec::new();
        if let Some(t) = &decl.type_annotation {
            texts.push(t);
        }
        if let Some(t) = &decl.return_type {
            texts.push(t);
        }
        if let Some(t) = &decl.extends {
            texts.push(t);
        }
        for t in &decl.implements {
            texts.push(t);
        }
        for p in &decl.parameters {
            if let Some(t) = &p.type_annotation {
                texts.push(t);
            }
        }
        for text in texts {
            for m in IDENTIFIER_RE.find_iter(text) {
                let name = m.as_str();
                if !TYPE_KEYWORDS.contains(&name) {
                    self.referenced_types.insert(name.to_string());
                }
            }
        }
        for member in &decl.members {
            self.collect_type_names(member);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::declaration::{DeclarationKind, ImportSpecifier};

    #[test]
    fn collects_import_bindings_and_exports() {
        let mut import = Declaration::new(DeclarationKind::Import, "bun");
        import.source = Some("bun".to_string());
        import.specifiers = vec![ImportSpecifier::new("serve").with_alias("s")];

        let mut func = Declaration::new(DeclarationKind::Function, "handler");
        func.is_exported = true;
        func.return_type = Some("Promise<Response>".to_string());

        let context = ProcessingContext::new(vec![import, func]);
        assert!(context.imports_by_module["bun"].contains("s"));
        assert!(context.exported_names.contains("handler"));
        assert!(context.referenced_types.contains("Response"));
    }
}
