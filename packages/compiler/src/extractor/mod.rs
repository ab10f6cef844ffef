/**
 * Declaration Extractor
 *
 * Converts scanned statement spans into Declarations: head classification,
 * header parsing, local type inference and overload grouping. Classification
 * never panics on malformed input; headers that fail to balance produce a
 * best-effort Declaration plus an EXTRACTION_ERROR diagnostic.
 */
pub mod declaration;
pub(crate) mod header;
pub mod inference;

use indexmap::IndexMap;

use crate::error::{Diagnostic, DiagnosticCode};
use crate::extractor::declaration::{
    AccessorKind, Declaration, DeclarationKind, Modifiers, VarKind,
};
use crate::extractor::header::Cursor;
use crate::extractor::inference::{infer, infer_parameter, infer_variable_type, synthesize_return_type};
use crate::parse_util::location_at;
use crate::scanner;

/// Extraction output: the declaration list plus accumulated diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub declarations: Vec<Declaration>,
    pub diagnostics: Vec<Diagnostic>,
}

// Diagnostics are collected with raw offsets during recursion and resolved
// to line/column positions once, against the full source.
struct PendingDiag {
    code: DiagnosticCode,
    message: String,
    offset: Option<usize>,
}

impl PendingDiag {
    fn new(code: DiagnosticCode, message: impl Into<String>, offset: Option<usize>) -> Self {
        PendingDiag {
            code,
            message: message.into(),
            offset,
        }
    }
}

/// Extract every top-level declaration from `source`.
pub fn extract_declarations(source: &str, file_path: &str, retain_comments: bool) -> ExtractResult {
    let mut pending = Vec::new();
    let declarations = extract_block(source, 0, retain_comments, &mut pending);
    let diagnostics = pending
        .into_iter()
        .map(|p| {
            let mut diag = Diagnostic::new(p.code, p.message, file_path);
            if let Some(offset) = p.offset {
                diag = diag.with_location(location_at(source, offset));
            }
            diag
        })
        .collect();
    ExtractResult {
        declarations,
        diagnostics,
    }
}

/// Extract declarations from one statement scope (the file, or a
/// namespace/module body). `base` is the absolute byte offset of `text`.
fn extract_block(
    text: &str,
    base: usize,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    let scan = scanner::scan(text);
    for err in &scan.errors {
        pending.push(PendingDiag::new(
            DiagnosticCode::ParseError,
            err.to_string(),
            Some(base + err.offset),
        ));
    }
    let stmts = scanner::statements(text, &scan, retain_comments);
    let mut declarations = Vec::new();
    for stmt in &stmts {
        let mut produced = classify_statement(
            stmt.text(text),
            base + stmt.start,
            base + stmt.end,
            retain_comments,
            pending,
        );
        // Bindings split from one statement all carry the statement's
        // comment block.
        for decl in &mut produced {
            decl.leading_comments = stmt.leading_comments.clone();
        }
        declarations.append(&mut produced);
    }
    group_overloads(&mut declarations);
    declarations
}

/// Classify one statement span into zero or more Declarations. Heads that
/// match no declaration form are silently skipped.
fn classify_statement(
    text: &str,
    start: usize,
    end: usize,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    let deco = header::skip_leading_decorators(text);
    let work = &text[deco..];
    if work.trim().is_empty() {
        return Vec::new();
    }
    let work_base = start + deco;
    let mut cur = Cursor::new(work);
    let mut is_exported = false;
    let mut is_default = false;
    let mut modifiers = Modifiers::empty();

    loop {
        cur.skip_trivia();
        let word = match cur.peek_word() {
            Some(w) => w,
            None => break,
        };
        match word {
            "export" => {
                cur.read_word();
                is_exported = true;
                cur.skip_trivia();
                match cur.at() {
                    Some(b'{') | Some(b'*') => {
                        return export_clause_statement(work, start, end, pending)
                    }
                    Some(b'=') => return export_assignment_statement(work, start, end),
                    _ => {}
                }
            }
            "default" if is_exported => {
                cur.read_word();
                is_default = true;
            }
            "declare" => {
                cur.read_word();
                modifiers |= Modifiers::DECLARE;
            }
            "abstract" => {
                cur.read_word();
                modifiers |= Modifiers::ABSTRACT;
            }
            "async" => {
                let save = cur.pos;
                cur.read_word();
                cur.skip_trivia();
                if cur.peek_word() == Some("function") {
                    return function_statement(work, start, end, is_exported, is_default, modifiers, pending);
                }
                cur.pos = save;
                break;
            }
            "import" => return import_statement(work, start, end, pending),
            "const" => {
                let save = cur.pos;
                cur.read_word();
                cur.skip_trivia();
                if cur.peek_word() == Some("enum") {
                    cur.pos = save;
                    return enum_statement(work, start, end, is_exported, is_default, modifiers, pending);
                }
                let rest = &work[cur.pos..];
                return variable_statement(work, rest, VarKind::Const, start, end, is_exported, modifiers);
            }
            "let" => {
                cur.read_word();
                let rest = &work[cur.pos..];
                return variable_statement(work, rest, VarKind::Let, start, end, is_exported, modifiers);
            }
            "var" => {
                cur.read_word();
                let rest = &work[cur.pos..];
                return variable_statement(work, rest, VarKind::Var, start, end, is_exported, modifiers);
            }
            "function" => {
                return function_statement(work, start, end, is_exported, is_default, modifiers, pending)
            }
            "class" => {
                return class_statement(
                    work, start, end, work_base, is_exported, is_default, modifiers,
                    retain_comments, pending,
                )
            }
            "interface" => {
                return interface_statement(
                    work, start, end, work_base, is_exported, modifiers, retain_comments, pending,
                )
            }
            "type" => {
                cur.read_word();
                return type_alias_statement(work, cur.pos, start, end, is_exported, modifiers);
            }
            "enum" => {
                return enum_statement(work, start, end, is_exported, is_default, modifiers, pending)
            }
            "namespace" => {
                return module_statement(
                    work, "namespace", DeclarationKind::Namespace, start, end, work_base,
                    is_exported, modifiers, retain_comments, pending,
                )
            }
            "module" => {
                return module_statement(
                    work, "module", DeclarationKind::Module, start, end, work_base, is_exported,
                    modifiers, retain_comments, pending,
                )
            }
            _ => break,
        }
    }

    if is_default {
        // `export default <expression>`; passed through verbatim.
        let mut decl = base_decl(DeclarationKind::Export, "default", work, start, end);
        decl.is_exported = true;
        decl.is_default = true;
        decl.modifiers = modifiers;
        return vec![decl];
    }
    Vec::new()
}

fn base_decl(
    kind: DeclarationKind,
    name: impl Into<String>,
    work: &str,
    start: usize,
    end: usize,
) -> Declaration {
    let mut decl = Declaration::new(kind, name);
    decl.text = work.to_string();
    decl.start = start;
    decl.end = end;
    decl
}

fn variable_statement(
    work: &str,
    rest: &str,
    kind: VarKind,
    start: usize,
    end: usize,
    is_exported: bool,
    modifiers: Modifiers,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for binding in header::parse_variable_bindings(rest) {
        if binding.name.is_empty() {
            continue;
        }
        let mut decl = base_decl(DeclarationKind::Variable, binding.name.clone(), work, start, end);
        decl.is_exported = is_exported;
        decl.modifiers = modifiers;
        decl.binding = Some(kind);
        match (&binding.annotation, &binding.initializer) {
            (Some(annotation), _) => decl.type_annotation = Some(annotation.clone()),
            (None, Some(initializer)) => {
                decl.type_annotation = Some(infer_variable_type(initializer, kind));
                decl.type_inferred = true;
            }
            (None, None) => {
                decl.type_annotation = Some("unknown".to_string());
                decl.type_inferred = true;
            }
        }
        declarations.push(decl);
    }
    declarations
}

fn function_statement(
    work: &str,
    start: usize,
    end: usize,
    is_exported: bool,
    is_default: bool,
    modifiers: Modifiers,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_function_header(work) {
        Ok(h) => {
            if h.name.is_empty() && !is_default {
                pending.push(PendingDiag::new(
                    DiagnosticCode::ExtractionError,
                    "function declaration without a name",
                    Some(start),
                ));
                return Vec::new();
            }
            let mut decl = base_decl(DeclarationKind::Function, h.name, work, start, end);
            decl.is_exported = is_exported;
            decl.is_default = is_default;
            decl.modifiers = modifiers;
            decl.generics = h.generics;
            let mut params = h.parameters;
            for p in &mut params {
                infer_parameter(p);
            }
            decl.parameters = params;
            match h.return_type {
                Some(ty) => decl.return_type = Some(ty),
                None => {
                    decl.return_type =
                        Some(synthesize_return_type(h.is_async, h.is_generator).to_string());
                    decl.type_inferred = true;
                }
            }
            decl.is_async = h.is_async;
            decl.is_generator = h.is_generator;
            decl.has_body = h.body_start.is_some();
            decl.body_start = h.body_start;
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("function declaration: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Function, "", work, start, end);
            decl.is_exported = is_exported;
            decl.is_default = is_default;
            decl.modifiers = modifiers;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

fn type_alias_statement(
    work: &str,
    after_kw: usize,
    start: usize,
    end: usize,
    is_exported: bool,
    modifiers: Modifiers,
) -> Vec<Declaration> {
    let mut cur = Cursor::new(work);
    cur.pos = after_kw;
    cur.skip_trivia();
    let name = match cur.read_word() {
        Some(w) => w.to_string(),
        // `type` was an expression head, not an alias declaration.
        None => return Vec::new(),
    };
    cur.skip_trivia();
    let generics = if cur.at() == Some(b'<') {
        let at = cur.pos;
        if cur.skip_angle() {
            Some(work[at..cur.pos].to_string())
        } else {
            None
        }
    } else {
        None
    };
    cur.skip_trivia();
    if cur.at() != Some(b'=') {
        return Vec::new();
    }
    let rhs = work[cur.pos + 1..].trim().trim_end_matches(';').trim_end();
    let mut decl = base_decl(DeclarationKind::Type, name, work, start, end);
    decl.is_exported = is_exported;
    decl.modifiers = modifiers;
    decl.generics = generics;
    decl.type_annotation = Some(rhs.to_string());
    vec![decl]
}

#[allow(clippy::too_many_arguments)]
fn class_statement(
    work: &str,
    start: usize,
    end: usize,
    work_base: usize,
    is_exported: bool,
    is_default: bool,
    modifiers: Modifiers,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_braced_header(work, "class") {
        Ok(h) => {
            let mut decl = base_decl(DeclarationKind::Class, h.name, work, start, end);
            decl.is_exported = is_exported;
            decl.is_default = is_default;
            decl.modifiers = modifiers;
            decl.generics = h.generics;
            decl.extends = h.extends.into_iter().next();
            decl.implements = h.implements;
            if let Some((body_start, body_end)) = h.body {
                decl.has_body = true;
                decl.body_start = Some(body_start - 1);
                decl.members = extract_class_members(
                    &work[body_start..body_end],
                    work_base + body_start,
                    retain_comments,
                    pending,
                );
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("class declaration: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Class, "", work, start, end);
            decl.is_exported = is_exported;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn interface_statement(
    work: &str,
    start: usize,
    end: usize,
    work_base: usize,
    is_exported: bool,
    modifiers: Modifiers,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_braced_header(work, "interface") {
        Ok(h) => {
            let mut decl = base_decl(DeclarationKind::Interface, h.name, work, start, end);
            decl.is_exported = is_exported;
            decl.modifiers = modifiers;
            decl.generics = h.generics;
            if !h.extends.is_empty() {
                decl.extends = Some(h.extends.join(", "));
            }
            if let Some((body_start, body_end)) = h.body {
                decl.has_body = true;
                decl.body_start = Some(body_start - 1);
                decl.members = extract_interface_members(
                    &work[body_start..body_end],
                    work_base + body_start,
                    retain_comments,
                    pending,
                );
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("interface declaration: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Interface, "", work, start, end);
            decl.is_exported = is_exported;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

fn enum_statement(
    work: &str,
    start: usize,
    end: usize,
    is_exported: bool,
    is_default: bool,
    modifiers: Modifiers,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_braced_header(work, "enum") {
        Ok(h) => {
            let mut decl = base_decl(DeclarationKind::Enum, h.name, work, start, end);
            decl.is_exported = is_exported;
            decl.is_default = is_default;
            decl.modifiers = modifiers;
            if let Some((body_start, body_end)) = h.body {
                decl.has_body = true;
                decl.body_start = Some(body_start - 1);
                for piece in header::split_top_level(&work[body_start..body_end], b',') {
                    let piece = piece.trim();
                    if piece.is_empty() {
                        continue;
                    }
                    let mut member_cur = Cursor::new(piece);
                    member_cur.skip_trivia();
                    let name = match member_cur.at() {
                        Some(b'\'') | Some(b'"') => member_cur
                            .read_string()
                            .map(|(_, raw)| raw)
                            .unwrap_or_default(),
                        _ => member_cur.read_word().unwrap_or("").to_string(),
                    };
                    if name.is_empty() {
                        continue;
                    }
                    let mut member = Declaration::new(DeclarationKind::Variable, name);
                    member.text = piece.to_string();
                    decl.members.push(member);
                }
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("enum declaration: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Enum, "", work, start, end);
            decl.is_exported = is_exported;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn module_statement(
    work: &str,
    keyword: &str,
    kind: DeclarationKind,
    start: usize,
    end: usize,
    work_base: usize,
    is_exported: bool,
    modifiers: Modifiers,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_braced_header(work, keyword) {
        Ok(h) => {
            let mut decl = base_decl(kind, h.name, work, start, end);
            decl.is_exported = is_exported;
            decl.modifiers = modifiers;
            if let Some((body_start, body_end)) = h.body {
                decl.has_body = true;
                decl.body_start = Some(body_start - 1);
                decl.members = extract_block(
                    &work[body_start..body_end],
                    work_base + body_start,
                    retain_comments,
                    pending,
                );
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("{} declaration: {}", keyword, message),
                Some(start),
            ));
            let mut decl = base_decl(kind, "", work, start, end);
            decl.is_exported = is_exported;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

fn import_statement(
    work: &str,
    start: usize,
    end: usize,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_import(work) {
        Ok(h) => {
            let name = h
                .source
                .as_ref()
                .map(|(unquoted, _)| unquoted.clone())
                .unwrap_or_default();
            let mut decl = base_decl(DeclarationKind::Import, name, work, start, end);
            decl.default_import = h.default_import;
            decl.namespace_import = h.namespace_import;
            decl.specifiers = h.specifiers;
            decl.is_type_only = h.is_type_only;
            decl.is_side_effect = h.is_side_effect;
            decl.is_import_equals = h.is_equals;
            if let Some((unquoted, raw)) = h.source {
                decl.source = Some(unquoted);
                decl.source_text = Some(raw);
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("import declaration: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Import, "", work, start, end);
            decl.error = Some(message);
            vec![decl]
        }
    }
}

fn export_clause_statement(
    work: &str,
    start: usize,
    end: usize,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    match header::parse_export_clause(work) {
        Ok(h) => {
            let name = h.star_alias.clone().unwrap_or_default();
            let mut decl = base_decl(DeclarationKind::Export, name, work, start, end);
            decl.is_exported = true;
            decl.specifiers = h.specifiers;
            decl.is_type_only = h.is_type_only;
            if let Some((unquoted, raw)) = h.source {
                decl.source = Some(unquoted);
                decl.source_text = Some(raw);
            }
            vec![decl]
        }
        Err(message) => {
            pending.push(PendingDiag::new(
                DiagnosticCode::ExtractionError,
                format!("export clause: {}", message),
                Some(start),
            ));
            let mut decl = base_decl(DeclarationKind::Export, "", work, start, end);
            decl.is_exported = true;
            decl.error = Some(message);
            vec![decl]
        }
    }
}

fn export_assignment_statement(work: &str, start: usize, end: usize) -> Vec<Declaration> {
    let mut decl = base_decl(DeclarationKind::Export, "", work, start, end);
    decl.is_exported = true;
    vec![decl]
}

/// Extract class body members, grouping overloaded method signatures.
fn extract_class_members(
    body: &str,
    base: usize,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    let scan = scanner::scan(body);
    for err in &scan.errors {
        pending.push(PendingDiag::new(
            DiagnosticCode::ParseError,
            err.to_string(),
            Some(base + err.offset),
        ));
    }
    let stmts = scanner::statements(body, &scan, retain_comments);
    let mut members = Vec::new();
    for stmt in &stmts {
        if let Some(mut member) =
            classify_member(stmt.text(body), base + stmt.start, base + stmt.end)
        {
            member.leading_comments = stmt.leading_comments.clone();
            members.push(member);
        }
    }
    group_overloads(&mut members);
    members
}

/// Interface bodies reuse the member classifier; anything it cannot shape
/// is kept verbatim so the interface text stays complete.
fn extract_interface_members(
    body: &str,
    base: usize,
    retain_comments: bool,
    pending: &mut Vec<PendingDiag>,
) -> Vec<Declaration> {
    let scan = scanner::scan(body);
    for err in &scan.errors {
        pending.push(PendingDiag::new(
            DiagnosticCode::ParseError,
            err.to_string(),
            Some(base + err.offset),
        ));
    }
    let stmts = scanner::statements(body, &scan, retain_comments);
    let mut members = Vec::new();
    for stmt in &stmts {
        let text = stmt.text(body);
        let member = classify_member(text, base + stmt.start, base + stmt.end).unwrap_or_else(|| {
            // Call/construct signatures and other unnamed members.
            let mut raw = Declaration::new(DeclarationKind::Variable, "");
            raw.text = text.trim().to_string();
            raw.start = base + stmt.start;
            raw.end = base + stmt.end;
            raw
        });
        members.push(member);
    }
    members
}

/// Classify one class/interface member statement.
fn classify_member(text: &str, start: usize, end: usize) -> Option<Declaration> {
    let deco = header::skip_leading_decorators(text);
    let work = &text[deco..];
    if work.trim().is_empty() {
        return None;
    }
    let mut cur = Cursor::new(work);
    let mut modifiers = Modifiers::empty();
    let mut is_async = false;
    let mut accessor: Option<AccessorKind> = None;

    loop {
        cur.skip_trivia();
        let word = match cur.peek_word() {
            Some(w) => w,
            None => break,
        };
        let flag = Modifiers::from_keyword(word);
        let save = cur.pos;
        match word {
            "public" | "private" | "protected" | "static" | "abstract" | "readonly"
            | "override" | "declare" => {
                cur.read_word();
                cur.skip_trivia();
                if member_token_follows(&cur) {
                    modifiers |= flag.unwrap_or_else(Modifiers::empty);
                } else {
                    cur.pos = save;
                    break;
                }
            }
            "async" => {
                cur.read_word();
                cur.skip_trivia();
                if member_token_follows(&cur) {
                    is_async = true;
                } else {
                    cur.pos = save;
                    break;
                }
            }
            "accessor" => {
                cur.read_word();
                cur.skip_trivia();
                if !member_token_follows(&cur) {
                    cur.pos = save;
                }
                break;
            }
            "get" | "set" => {
                cur.read_word();
                cur.skip_trivia();
                if member_token_follows(&cur) {
                    accessor = Some(if word == "get" {
                        AccessorKind::Getter
                    } else {
                        AccessorKind::Setter
                    });
                } else {
                    cur.pos = save;
                }
                break;
            }
            _ => break,
        }
    }

    cur.skip_trivia();
    let rest_at = cur.pos;
    let rest = &work[rest_at..];
    if rest.trim().is_empty() {
        return None;
    }

    match header::parse_method_header(rest) {
        Ok(h) => {
            let mut member = Declaration::new(DeclarationKind::Function, h.name);
            member.text = work.trim().to_string();
            member.start = start;
            member.end = end;
            member.modifiers = modifiers;
            member.accessor = accessor;
            member.generics = h.generics;
            let mut params = h.parameters;
            for p in &mut params {
                infer_parameter(p);
            }
            member.parameters = params;
            member.is_optional = h.optional;
            member.is_async = is_async;
            member.is_generator = h.is_generator;
            member.has_body = h.body_start.is_some();
            member.body_start = h.body_start.map(|i| i + rest_at);
            member.return_type = match h.return_type {
                Some(ty) => Some(ty),
                None => match accessor {
                    Some(AccessorKind::Getter) => {
                        member.type_inferred = true;
                        Some("unknown".to_string())
                    }
                    Some(AccessorKind::Setter) => None,
                    None => {
                        member.type_inferred = true;
                        Some(synthesize_return_type(is_async, h.is_generator).to_string())
                    }
                },
            };
            Some(member)
        }
        Err(_) => classify_property(work, rest, start, end, modifiers),
    }
}

fn member_token_follows(cur: &Cursor) -> bool {
    matches!(
        cur.at(),
        Some(b) if crate::chars::is_identifier_byte(b)
            || b == b'#'
            || b == b'['
            || b == b'*'
            || b == b'\''
            || b == b'"'
    )
}

/// Property member: `name?: T = init`, index signatures included.
fn classify_property(
    work: &str,
    rest: &str,
    start: usize,
    end: usize,
    modifiers: Modifiers,
) -> Option<Declaration> {
    let mut cur = Cursor::new(rest);
    cur.skip_trivia();
    let name = match cur.at() {
        Some(b'#') => {
            cur.pos += 1;
            format!("#{}", cur.read_word().unwrap_or(""))
        }
        Some(b'[') => {
            let at = cur.pos;
            if !cur.skip_balanced() {
                return None;
            }
            rest[at..cur.pos].to_string()
        }
        Some(b'\'') | Some(b'"') => cur.read_string().map(|(_, raw)| raw)?,
        _ => cur.read_word()?.to_string(),
    };
    let mut member = Declaration::new(DeclarationKind::Variable, name);
    member.text = work.trim().to_string();
    member.start = start;
    member.end = end;
    member.modifiers = modifiers;
    cur.skip_trivia();
    if cur.at() == Some(b'?') {
        member.is_optional = true;
        cur.pos += 1;
        cur.skip_trivia();
    }
    if cur.at() == Some(b'!') {
        cur.pos += 1;
        cur.skip_trivia();
    }
    let mut annotation = None;
    let mut initializer = None;
    if cur.at() == Some(b':') {
        cur.pos += 1;
        let tail = rest[cur.pos..].trim().trim_end_matches(';').trim_end();
        match header::find_assignment(tail) {
            Some(eq) => {
                annotation = Some(tail[..eq].trim().to_string());
                initializer = Some(tail[eq + 1..].trim().to_string());
            }
            None => annotation = Some(tail.to_string()),
        }
    } else if cur.at() == Some(b'=') {
        let tail = rest[cur.pos + 1..].trim().trim_end_matches(';').trim_end();
        initializer = Some(tail.to_string());
    }
    match (annotation, initializer) {
        (Some(ty), _) => member.type_annotation = Some(ty),
        (None, Some(init)) => {
            // Static readonly narrows like const; instance properties widen.
            let narrow = member.modifiers.contains(Modifiers::STATIC)
                && member.modifiers.contains(Modifiers::READONLY);
            member.type_annotation = Some(infer(&init, narrow));
            member.type_inferred = true;
        }
        (None, None) => {
            member.type_annotation = Some("unknown".to_string());
            member.type_inferred = true;
        }
    }
    Some(member)
}

/// Collapse same-named function declarations at one scope into a single
/// overload group. Signatures keep source order; the implementation
/// signature comes last with its body elided.
fn group_overloads(declarations: &mut Vec<Declaration>) {
    let mut grouped: Vec<Declaration> = Vec::with_capacity(declarations.len());
    let mut by_name: IndexMap<String, usize> = IndexMap::new();
    for decl in declarations.drain(..) {
        if decl.kind == DeclarationKind::Function
            && !decl.name.is_empty()
            && decl.accessor.is_none()
        {
            if let Some(&idx) = by_name.get(&decl.name) {
                let holder = &mut grouped[idx];
                if holder.overloads.is_empty() {
                    let sig = holder.signature_text();
                    let had_body = holder.has_body;
                    holder.overloads.push(sig);
                    holder.overload_bodies.push(had_body);
                }
                holder.overloads.push(decl.signature_text());
                holder.overload_bodies.push(decl.has_body);
                continue;
            }
            by_name.insert(decl.name.clone(), grouped.len());
        }
        grouped.push(decl);
    }
    for decl in grouped.iter_mut() {
        if !decl.overloads.is_empty() {
            decl.text = decl.overloads.join("\n");
            decl.has_body = false;
            decl.body_start = None;
        }
    }
    *declarations = grouped;
}
