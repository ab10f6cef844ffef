/**
 * Declaration Processor
 *
 * Transforms extracted Declarations into final `.d.ts` text: body elision,
 * `declare` insertion, private-member filtering, parameter-property
 * expansion, import grouping and deterministic emission order. Every path
 * is total; a declaration that cannot be rebuilt falls back to its captured
 * text.
 */
pub mod context;
pub mod imports;

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::config::GenerateOptions;
use crate::error::{Diagnostic, DiagnosticCode};
use crate::extractor::declaration::{
    AccessorKind, Declaration, DeclarationKind, Modifiers, Parameter, Visibility,
};
use crate::extractor::header::Cursor;
use crate::extractor::inference::render_inferred_parameter;
use crate::processor::context::ProcessingContext;

const INDENT_WITH: &str = "  ";

lazy_static! {
    static ref KIND_KEYWORDS: HashMap<DeclarationKind, &'static str> = {
        let mut m = HashMap::new();
        m.insert(DeclarationKind::Function, "function");
        m.insert(DeclarationKind::Interface, "interface");
        m.insert(DeclarationKind::Type, "type");
        m.insert(DeclarationKind::Class, "class");
        m.insert(DeclarationKind::Enum, "enum");
        m.insert(DeclarationKind::Namespace, "namespace");
        m.insert(DeclarationKind::Module, "module");
        m
    };
}

/// Processing output: the declaration text plus accumulated diagnostics.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Transform a declaration list into the final file text.
pub fn process(
    declarations: Vec<Declaration>,
    options: &GenerateOptions,
    file_path: &str,
) -> ProcessResult {
    let context = ProcessingContext::new(declarations);
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let mut import_decls: Vec<&Declaration> = Vec::new();
    let mut body_decls: Vec<&Declaration> = Vec::new();
    for decl in &context.declarations {
        if decl.is_import() {
            import_decls.push(decl);
        } else {
            body_decls.push(decl);
        }
    }

    let import_block = imports::emit_import_block(&import_decls, &options.import_order);

    let mut body = String::new();
    for decl in body_decls {
        let rendered = render_declaration(decl, false, file_path, &mut diagnostics);
        let rendered = rendered.trim_end();
        if rendered.is_empty() {
            continue;
        }
        if !decl.leading_comments.is_empty() && !body.is_empty() {
            body.push('\n');
        }
        for comment in &decl.leading_comments {
            body.push_str(comment);
            body.push('\n');
        }
        body.push_str(rendered);
        body.push('\n');
    }

    let mut output = String::new();
    if !import_block.is_empty() {
        output.push_str(&import_block);
        output.push('\n');
        if !body.is_empty() {
            output.push('\n');
        }
    }
    output.push_str(&body);
    while output.ends_with("\n\n") {
        output.pop();
    }
    if !output.ends_with('\n') {
        output.push('\n');
    }
    ProcessResult {
        output,
        diagnostics,
    }
}

/// Render one declaration. `ambient` is true inside a `declare namespace`
/// body, where the prefix is implicit.
fn render_declaration(
    decl: &Declaration,
    ambient: bool,
    file_path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    if decl.error.is_some() {
        return fallback_text(decl, ambient);
    }
    if decl.is_function() && decl.name.is_empty() && !decl.is_default {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::ProcessingError,
            "dropped function declaration without a name",
            file_path,
        ));
        return String::new();
    }
    match decl.kind {
        DeclarationKind::Function => render_function(decl, ambient),
        DeclarationKind::Variable => render_variable(decl, ambient, file_path, diagnostics),
        DeclarationKind::Interface | DeclarationKind::Type | DeclarationKind::Enum => {
            render_verbatim(decl, ambient)
        }
        DeclarationKind::Class => render_class(decl, ambient),
        DeclarationKind::Namespace | DeclarationKind::Module => {
            render_module(decl, ambient, file_path, diagnostics)
        }
        DeclarationKind::Export => imports::ensure_semicolon(decl.text.trim()),
        DeclarationKind::Import => imports::render_import(decl),
    }
}

fn declaration_prefix(decl: &Declaration, ambient: bool) -> String {
    let mut prefix = String::new();
    if decl.is_exported {
        prefix.push_str("export ");
    }
    if decl.is_default {
        prefix.push_str("default ");
    }
    if !ambient && !decl.is_default {
        prefix.push_str("declare ");
    }
    prefix
}

fn render_function(decl: &Declaration, ambient: bool) -> String {
    let prefix = declaration_prefix(decl, ambient);
    if !decl.overloads.is_empty() {
        let any_signature_only = decl.overload_bodies.iter().any(|had_body| !*had_body);
        let lines: Vec<String> = decl
            .overloads
            .iter()
            .zip(&decl.overload_bodies)
            .filter(|(_, had_body)| !any_signature_only || !**had_body)
            .map(|(sig, _)| format!("{}{}", prefix, normalize_function_signature(sig)))
            .collect();
        return lines.join("\n");
    }
    let mut out = prefix;
    out.push_str("function ");
    out.push_str(&decl.name);
    if let Some(generics) = &decl.generics {
        out.push_str(generics);
    }
    out.push('(');
    out.push_str(&render_parameters(&decl.parameters));
    out.push_str("): ");
    out.push_str(decl.return_type.as_deref().unwrap_or("void"));
    out.push(';');
    out
}

/// Strip prefix keywords and the generator `*` from a raw signature so the
/// emission prefix can be applied uniformly.
fn normalize_function_signature(signature: &str) -> String {
    let stripped = strip_leading_keywords(signature, &["export", "default", "declare", "async"]);
    if let Some(rest) = stripped.strip_prefix("function") {
        let rest = rest.trim_start();
        let rest = rest.strip_prefix('*').map(str::trim_start).unwrap_or(rest);
        format!("function {}", rest)
    } else {
        stripped.to_string()
    }
}

fn render_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(render_inferred_parameter)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_variable(
    decl: &Declaration,
    ambient: bool,
    file_path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let keyword = decl.binding.map(|b| b.as_str()).unwrap_or("const");
    let ty = decl
        .type_annotation
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    if decl.type_inferred && ty == "unknown" {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::UnresolvedType,
            format!("type of `{}` could not be inferred", decl.name),
            file_path,
        ));
    }
    format!(
        "{}{} {}: {};",
        declaration_prefix(decl, ambient),
        keyword,
        decl.name,
        ty
    )
}

/// Interfaces, type aliases and enums are emitted from their captured text
/// with the prefix rebuilt; internal indentation is preserved as captured.
fn render_verbatim(decl: &Declaration, ambient: bool) -> String {
    let stripped = strip_leading_keywords(&decl.text, &["export", "default", "declare"]);
    let mut out = declaration_prefix(decl, ambient);
    out.push_str(stripped);
    imports::ensure_semicolon(&out)
}

fn render_class(decl: &Declaration, ambient: bool) -> String {
    let mut out = declaration_prefix(decl, ambient);
    if decl.modifiers.contains(Modifiers::ABSTRACT) {
        out.push_str("abstract ");
    }
    out.push_str("class");
    if !decl.name.is_empty() {
        out.push(' ');
        out.push_str(&decl.name);
    }
    if let Some(generics) = &decl.generics {
        out.push_str(generics);
    }
    if let Some(extends) = &decl.extends {
        out.push_str(" extends ");
        out.push_str(extends);
    }
    if !decl.implements.is_empty() {
        out.push_str(" implements ");
        out.push_str(&decl.implements.join(", "));
    }
    if !decl.has_body {
        out.push_str(" {}");
        return out;
    }
    out.push_str(" {\n");

    let mut lines: Vec<String> = Vec::new();
    let constructor = decl
        .members
        .iter()
        .find(|m| m.is_function() && m.name == "constructor" && m.accessor.is_none());
    if let Some(ctor) = constructor {
        for param in &ctor.parameters {
            if !param.is_property() || param.visibility == Some(Visibility::Private) {
                continue;
            }
            let mut line = String::new();
            if let Some(visibility) = param.visibility {
                line.push_str(visibility.as_str());
                line.push(' ');
            }
            if param.readonly {
                line.push_str("readonly ");
            }
            line.push_str(&param.name);
            line.push_str(": ");
            line.push_str(param.type_annotation.as_deref().unwrap_or("unknown"));
            line.push(';');
            lines.push(line);
        }
    }
    for member in &decl.members {
        if member.is_private() {
            continue;
        }
        if let Some(rendered) = render_member(member) {
            for comment in &member.leading_comments {
                lines.push(comment.clone());
            }
            lines.push(rendered);
        }
    }
    for line in lines {
        for piece in line.split('\n') {
            out.push_str(INDENT_WITH);
            out.push_str(piece);
            out.push('\n');
        }
    }
    out.push('}');
    out
}

fn render_member(member: &Declaration) -> Option<String> {
    match member.kind {
        DeclarationKind::Function => {
            if !member.overloads.is_empty() {
                let any_signature_only = member.overload_bodies.iter().any(|had_body| !*had_body);
                let lines: Vec<String> = member
                    .overloads
                    .iter()
                    .zip(&member.overload_bodies)
                    .filter(|(_, had_body)| !any_signature_only || !**had_body)
                    .map(|(sig, _)| sig.clone())
                    .collect();
                return Some(lines.join("\n"));
            }
            let mods = member_modifiers(&member.modifiers);
            match member.accessor {
                Some(AccessorKind::Getter) => Some(format!(
                    "{}get {}(): {};",
                    mods,
                    member.name,
                    member.return_type.as_deref().unwrap_or("unknown")
                )),
                Some(AccessorKind::Setter) => Some(format!(
                    "{}set {}({});",
                    mods,
                    member.name,
                    render_parameters(&member.parameters)
                )),
                None if member.name == "constructor" => Some(format!(
                    "{}constructor({});",
                    mods,
                    render_parameters(&member.parameters)
                )),
                None => {
                    let mut line = mods;
                    line.push_str(&member.name);
                    if member.is_optional {
                        line.push('?');
                    }
                    if let Some(generics) = &member.generics {
                        line.push_str(generics);
                    }
                    line.push('(');
                    line.push_str(&render_parameters(&member.parameters));
                    line.push_str("): ");
                    line.push_str(member.return_type.as_deref().unwrap_or("void"));
                    line.push(';');
                    Some(line)
                }
            }
        }
        DeclarationKind::Variable => {
            if member.name.is_empty() {
                // Call/construct/index signature captured verbatim.
                if member.text.trim().is_empty() {
                    return None;
                }
                return Some(imports::ensure_semicolon(member.text.trim()));
            }
            let mut line = member_modifiers(&member.modifiers);
            line.push_str(&member.name);
            if member.is_optional {
                line.push('?');
            }
            line.push_str(": ");
            line.push_str(member.type_annotation.as_deref().unwrap_or("unknown"));
            line.push(';');
            Some(line)
        }
        _ => Some(imports::ensure_semicolon(member.text.trim())),
    }
}

/// Modifier keywords valid on an emitted member; `declare` and `async`
/// never appear in declaration output.
fn member_modifiers(modifiers: &Modifiers) -> String {
    let words: Vec<&str> = modifiers
        .keywords()
        .into_iter()
        .filter(|k| !matches!(*k, "declare" | "async"))
        .collect();
    if words.is_empty() {
        String::new()
    } else {
        format!("{} ", words.join(" "))
    }
}

fn render_module(
    decl: &Declaration,
    ambient: bool,
    file_path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let keyword = KIND_KEYWORDS.get(&decl.kind).copied().unwrap_or("namespace");
    let mut out = declaration_prefix(decl, ambient);
    out.push_str(keyword);
    out.push(' ');
    out.push_str(&decl.name);
    if !decl.has_body {
        out.push(';');
        return out;
    }
    out.push_str(" {\n");
    for member in &decl.members {
        let rendered = render_declaration(member, true, file_path, diagnostics);
        let rendered = rendered.trim_end();
        if rendered.is_empty() {
            continue;
        }
        for comment in &member.leading_comments {
            for piece in comment.split('\n') {
                out.push_str(INDENT_WITH);
                out.push_str(piece);
                out.push('\n');
            }
        }
        for piece in rendered.split('\n') {
            out.push_str(INDENT_WITH);
            out.push_str(piece);
            out.push('\n');
        }
    }
    out.push('}');
    out
}

/// Total fallback: captured text, `declare`-wrapped when exported.
fn fallback_text(decl: &Declaration, ambient: bool) -> String {
    if decl.is_exported {
        let stripped = strip_leading_keywords(&decl.text, &["export", "declare"]);
        let mut out = String::from("export ");
        // `export default` never takes a `declare` prefix.
        if !ambient && !stripped.starts_with("default") {
            out.push_str("declare ");
        }
        out.push_str(stripped);
        imports::ensure_semicolon(&out)
    } else {
        imports::ensure_semicolon(decl.text.trim())
    }
}

fn strip_leading_keywords<'a>(text: &'a str, words: &[&str]) -> &'a str {
    let mut cur = Cursor::new(text);
    loop {
        cur.skip_trivia();
        match cur.peek_word() {
            Some(w) if words.contains(&w) => {
                cur.read_word();
            }
            _ => break,
        }
    }
    text[cur.pos..].trim_start()
}
