/**
 * Initializer Type Inference
 *
 * Syntax-only inference for unannotated bindings, parameters and class
 * properties. Initializer expressions are classified into a closed set of
 * shapes and mapped through the narrowing/widening table; nothing is ever
 * evaluated.
 */
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractor::declaration::{Parameter, VarKind};
use crate::extractor::header::{
    parse_function_header, parse_method_header, parse_parameter_list, split_top_level,
    top_level_word_positions, Cursor,
};

static NUMERIC_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|(?:\d[\d_]*\.?[\d_]*|\.\d[\d_]*)(?:[eE][+-]?\d+)?)$")
        .unwrap()
});

static BIGINT_LITERAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d[\d_]*n$").unwrap());

/// The closed set of initializer shapes the inference table dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializerShape<'a> {
    StringLiteral(&'a str),
    NumberLiteral(&'a str),
    BigIntLiteral(&'a str),
    BoolLiteral(&'a str),
    Null,
    Undefined,
    /// Template literal without interpolation, raw text with backticks.
    TemplatePlain(&'a str),
    TemplateInterpolated,
    /// Inner text of an array literal.
    ArrayLiteral(&'a str),
    /// Inner text of an object literal.
    ObjectLiteral(&'a str),
    /// `expr as const`; carries the expression.
    AsConst(&'a str),
    /// `expr as T`; carries the type text.
    AsCast(&'a str),
    /// `expr satisfies T`; carries the type text.
    Satisfies(&'a str),
    /// Arrow function expression, full text.
    Arrow(&'a str),
    /// `function` expression, full text.
    FunctionExpr(&'a str),
    /// `new X(…)`; carries the constructor expression.
    New(&'a str),
    RegexLiteral,
    Other,
}

/// Classify an initializer expression by its head and top-level operators.
pub fn classify_initializer(expr: &str) -> InitializerShape<'_> {
    let expr = strip_wrapping_parens(expr.trim());

    // `as` / `satisfies` bind loosest; the rightmost occurrence wins.
    let as_pos = top_level_word_positions(expr, "as").into_iter().last();
    let satisfies_pos = top_level_word_positions(expr, "satisfies").into_iter().last();
    match (as_pos, satisfies_pos) {
        (Some(a), sat) if sat.map(|s| a > s).unwrap_or(true) => {
            let lhs = expr[..a].trim_end();
            let rhs = expr[a + "as".len()..].trim();
            if !lhs.is_empty() && !rhs.is_empty() {
                return if rhs == "const" {
                    InitializerShape::AsConst(lhs)
                } else {
                    InitializerShape::AsCast(rhs)
                };
            }
        }
        (_, Some(s)) => {
            let lhs = expr[..s].trim_end();
            let rhs = expr[s + "satisfies".len()..].trim();
            if !lhs.is_empty() && !rhs.is_empty() {
                return InitializerShape::Satisfies(rhs);
            }
        }
        _ => {}
    }

    if has_top_level_arrow(expr) {
        return InitializerShape::Arrow(expr);
    }

    match expr {
        "true" | "false" => return InitializerShape::BoolLiteral(expr),
        "null" => return InitializerShape::Null,
        "undefined" => return InitializerShape::Undefined,
        _ => {}
    }
    if BIGINT_LITERAL_RE.is_match(expr) {
        return InitializerShape::BigIntLiteral(expr);
    }
    if NUMERIC_LITERAL_RE.is_match(expr) {
        return InitializerShape::NumberLiteral(expr);
    }

    let bytes = expr.as_bytes();
    match bytes.first().copied() {
        Some(b'\'') | Some(b'"') if is_whole_string(expr) => {
            return InitializerShape::StringLiteral(expr)
        }
        Some(b'`') if is_whole_template(expr) => {
            return if template_has_interpolation(expr) {
                InitializerShape::TemplateInterpolated
            } else {
                InitializerShape::TemplatePlain(expr)
            };
        }
        Some(b'[') if is_whole_balanced(expr) => {
            return InitializerShape::ArrayLiteral(&expr[1..expr.len() - 1])
        }
        Some(b'{') if is_whole_balanced(expr) => {
            return InitializerShape::ObjectLiteral(&expr[1..expr.len() - 1])
        }
        Some(b'/') if bytes.get(1) != Some(&b'/') && bytes.get(1) != Some(&b'*') => {
            return InitializerShape::RegexLiteral
        }
        _ => {}
    }

    let mut cur = Cursor::new(expr);
    match cur.peek_word() {
        Some("function") => return InitializerShape::FunctionExpr(expr),
        Some("async") => {
            cur.read_word();
            cur.skip_trivia();
            if cur.peek_word() == Some("function") {
                return InitializerShape::FunctionExpr(expr);
            }
        }
        Some("new") => {
            cur.read_word();
            cur.skip_trivia();
            let ctor_start = cur.pos;
            let ctor = constructor_expression(&expr[ctor_start..]);
            if !ctor.is_empty() {
                return InitializerShape::New(ctor);
            }
        }
        _ => {}
    }
    InitializerShape::Other
}

/// Infer the declared type of a variable binding from its initializer.
pub fn infer_variable_type(initializer: &str, kind: VarKind) -> String {
    infer(initializer, kind.narrows())
}

/// The narrowing/widening table. `narrow` is true for `const`-like
/// positions.
pub(crate) fn infer(expr: &str, narrow: bool) -> String {
    match classify_initializer(expr) {
        InitializerShape::StringLiteral(raw) => pick(narrow, raw, "string"),
        InitializerShape::TemplatePlain(raw) => pick(narrow, raw, "string"),
        InitializerShape::TemplateInterpolated => "string".to_string(),
        InitializerShape::NumberLiteral(raw) => pick(narrow, raw, "number"),
        InitializerShape::BigIntLiteral(raw) => pick(narrow, raw, "bigint"),
        InitializerShape::BoolLiteral(raw) => pick(narrow, raw, "boolean"),
        InitializerShape::Null => "null".to_string(),
        InitializerShape::Undefined => "undefined".to_string(),
        InitializerShape::ArrayLiteral(inner) => array_type(inner),
        InitializerShape::ObjectLiteral(inner) => object_type(inner),
        InitializerShape::AsConst(lhs) => infer_as_const(lhs),
        InitializerShape::AsCast(ty) | InitializerShape::Satisfies(ty) => ty.to_string(),
        InitializerShape::Arrow(text) => {
            arrow_type(text).unwrap_or_else(|| "unknown".to_string())
        }
        InitializerShape::FunctionExpr(text) => {
            function_expr_type(text).unwrap_or_else(|| "unknown".to_string())
        }
        InitializerShape::New(ctor) => ctor.to_string(),
        InitializerShape::RegexLiteral => "RegExp".to_string(),
        InitializerShape::Other => "unknown".to_string(),
    }
}

/// Readonly-deep narrowing for `expr as const`.
pub fn infer_as_const(expr: &str) -> String {
    match classify_initializer(expr) {
        InitializerShape::StringLiteral(raw)
        | InitializerShape::NumberLiteral(raw)
        | InitializerShape::BigIntLiteral(raw)
        | InitializerShape::BoolLiteral(raw)
        | InitializerShape::TemplatePlain(raw) => raw.to_string(),
        InitializerShape::Null => "null".to_string(),
        InitializerShape::Undefined => "undefined".to_string(),
        InitializerShape::TemplateInterpolated => "string".to_string(),
        InitializerShape::ArrayLiteral(inner) => {
            let elements: Vec<String> = split_top_level(inner, b',')
                .into_iter()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(infer_as_const)
                .collect();
            format!("readonly [{}]", elements.join(", "))
        }
        InitializerShape::ObjectLiteral(inner) => object_type_with(inner, true),
        InitializerShape::AsConst(lhs) => infer_as_const(lhs),
        InitializerShape::AsCast(ty) | InitializerShape::Satisfies(ty) => ty.to_string(),
        InitializerShape::Arrow(text) => {
            arrow_type(text).unwrap_or_else(|| "unknown".to_string())
        }
        InitializerShape::FunctionExpr(text) => {
            function_expr_type(text).unwrap_or_else(|| "unknown".to_string())
        }
        InitializerShape::New(ctor) => ctor.to_string(),
        InitializerShape::RegexLiteral => "RegExp".to_string(),
        InitializerShape::Other => "unknown".to_string(),
    }
}

/// Return-shape synthesis from the function prefix alone; bodies are never
/// inspected.
pub fn synthesize_return_type(is_async: bool, is_generator: bool) -> &'static str {
    match (is_async, is_generator) {
        (false, false) => "void",
        (true, false) => "Promise<void>",
        (false, true) => "Generator<unknown, void, unknown>",
        (true, true) => "AsyncGenerator<unknown, void, unknown>",
    }
}

/// Fill in a parameter's type when the annotation is missing: defaults
/// infer (widened) and make the parameter optional; rest parameters become
/// `unknown[]`; anything else is `unknown`.
pub fn infer_parameter(param: &mut Parameter) {
    if param.type_annotation.is_some() {
        if param.default_value.is_some() {
            param.optional = true;
        }
        return;
    }
    match &param.default_value {
        Some(default) => {
            param.type_annotation = Some(infer(default, false));
            param.optional = true;
        }
        None if param.rest => param.type_annotation = Some("unknown[]".to_string()),
        None => param.type_annotation = Some("unknown".to_string()),
    }
}

fn pick(narrow: bool, narrowed: &str, widened: &str) -> String {
    if narrow {
        narrowed.to_string()
    } else {
        widened.to_string()
    }
}

fn strip_wrapping_parens(expr: &str) -> &str {
    let mut expr = expr;
    loop {
        if !expr.starts_with('(') {
            return expr;
        }
        let mut cur = Cursor::new(expr);
        if !cur.skip_balanced() {
            return expr;
        }
        if cur.pos == expr.len() {
            expr = expr[1..expr.len() - 1].trim();
        } else {
            return expr;
        }
    }
}

fn has_top_level_arrow(expr: &str) -> bool {
    let mut cur = Cursor::new(expr);
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => cur.skip_trivia(),
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    return false;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            b'=' if cur.peek(1) == Some(b'>') => return true,
            _ => cur.pos += 1,
        }
    }
    false
}

fn is_whole_string(expr: &str) -> bool {
    let mut cur = Cursor::new(expr);
    cur.skip_string();
    cur.pos == expr.len()
}

fn is_whole_template(expr: &str) -> bool {
    let mut cur = Cursor::new(expr);
    cur.skip_template();
    cur.pos == expr.len()
}

fn is_whole_balanced(expr: &str) -> bool {
    let mut cur = Cursor::new(expr);
    cur.skip_balanced() && cur.pos == expr.len()
}

fn template_has_interpolation(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 1;
    while i + 1 < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => return true,
            _ => i += 1,
        }
    }
    false
}

/// `new X(…)` constructor expression including generic arguments.
fn constructor_expression(rest: &str) -> &str {
    let mut cur = Cursor::new(rest);
    while let Some(b) = cur.at() {
        match b {
            b'(' => return rest[..cur.pos].trim_end(),
            b'<' => {
                if !cur.skip_angle() {
                    return rest[..cur.pos].trim_end();
                }
            }
            _ if chars_ident_or_dot(b) => cur.pos += 1,
            _ => return rest[..cur.pos].trim_end(),
        }
    }
    rest.trim_end()
}

fn chars_ident_or_dot(b: u8) -> bool {
    crate::chars::is_identifier_byte(b) || b == b'.'
}

/// Widened union of array element types.
fn array_type(inner: &str) -> String {
    let mut element_types: Vec<String> = Vec::new();
    for piece in split_top_level(inner, b',') {
        let piece = piece.trim();
        if piece.is_empty() || piece.starts_with("...") {
            continue;
        }
        let ty = infer(piece, false);
        if !element_types.contains(&ty) {
            element_types.push(ty);
        }
    }
    match element_types.len() {
        0 => "unknown[]".to_string(),
        1 => {
            let ty = &element_types[0];
            if needs_parens(ty) {
                format!("({})[]", ty)
            } else {
                format!("{}[]", ty)
            }
        }
        _ => format!("({})[]", element_types.join(" | ")),
    }
}

fn object_type(inner: &str) -> String {
    object_type_with(inner, false)
}

/// Object type synthesis. In `as const` position every property narrows
/// and becomes `readonly`.
fn object_type_with(inner: &str, as_const: bool) -> String {
    let mut entries: Vec<String> = Vec::new();
    for piece in split_top_level(inner, b',') {
        let piece = piece.trim();
        if piece.is_empty() || piece.starts_with("...") {
            continue;
        }
        if let Some(entry) = object_entry(piece, as_const) {
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join("; "))
    }
}

fn object_entry(piece: &str, as_const: bool) -> Option<String> {
    let readonly = if as_const { "readonly " } else { "" };

    if let Some((key, params, ret)) = object_method(piece) {
        let rendered: Vec<String> = params.iter().map(render_inferred_parameter).collect();
        return Some(format!(
            "{}{}: ({}) => {}",
            readonly,
            key,
            rendered.join(", "),
            ret
        ));
    }

    // `key: value`, quoted or computed keys preserved as written.
    let mut cur = Cursor::new(piece);
    cur.skip_trivia();
    let key_start = cur.pos;
    match cur.at() {
        Some(b'\'') | Some(b'"') => cur.skip_string(),
        Some(b'[') => {
            if !cur.skip_balanced() {
                return None;
            }
        }
        _ => {
            cur.read_word()?;
        }
    }
    let key = piece[key_start..cur.pos].to_string();
    cur.skip_trivia();
    match cur.at() {
        Some(b':') => {
            let value = piece[cur.pos + 1..].trim();
            let ty = if as_const {
                infer_as_const(value)
            } else {
                infer(value, false)
            };
            Some(format!("{}{}: {}", readonly, key, ty))
        }
        // Shorthand property; the referenced value is not resolvable.
        None => Some(format!("{}{}: unknown", readonly, key)),
        _ => Some(format!("{}{}: unknown", readonly, key)),
    }
}

/// Detect an object-literal method and return `(name, parameters, return)`.
fn object_method(piece: &str) -> Option<(String, Vec<Parameter>, String)> {
    let mut cur = Cursor::new(piece);
    cur.skip_trivia();
    let mut is_async = false;
    let mut is_generator = false;
    loop {
        match cur.peek_word() {
            Some("async") => {
                is_async = true;
                cur.read_word();
                cur.skip_trivia();
            }
            Some("get") | Some("set") => return None,
            _ => break,
        }
    }
    if cur.at() == Some(b'*') {
        is_generator = true;
        cur.pos += 1;
        cur.skip_trivia();
    }
    let tail = &piece[cur.pos..];
    let header = parse_method_header(tail).ok()?;
    if header.body_start.is_none() {
        return None;
    }
    let mut params = header.parameters;
    for p in &mut params {
        infer_parameter(p);
    }
    let ret = header
        .return_type
        .unwrap_or_else(|| synthesize_return_type(is_async, is_generator || header.is_generator).to_string());
    Some((header.name, params, ret))
}

/// Synthesize the function type of an arrow expression.
fn arrow_type(expr: &str) -> Option<String> {
    let arrow = find_top_level_arrow(expr)?;
    let head = expr[..arrow].trim_end();
    let mut cur = Cursor::new(head);
    cur.skip_trivia();
    let mut is_async = false;
    if cur.peek_word() == Some("async") {
        is_async = true;
        cur.read_word();
        cur.skip_trivia();
    }
    let generics = if cur.at() == Some(b'<') {
        let start = cur.pos;
        if !cur.skip_angle() {
            return None;
        }
        Some(head[start..cur.pos].to_string())
    } else {
        None
    };
    cur.skip_trivia();
    let (mut params, return_annotation) = if cur.at() == Some(b'(') {
        let open = cur.pos;
        if !cur.skip_balanced() {
            return None;
        }
        let inner = &head[open + 1..cur.pos - 1];
        cur.skip_trivia();
        let annotation = if cur.at() == Some(b':') {
            let ty = head[cur.pos + 1..].trim();
            if ty.is_empty() {
                None
            } else {
                Some(ty.to_string())
            }
        } else {
            None
        };
        (parse_parameter_list(inner), annotation)
    } else {
        // Single bare parameter.
        let name = cur.read_word()?;
        (vec![Parameter::new(name)], None)
    };
    for p in &mut params {
        infer_parameter(p);
    }
    let rendered: Vec<String> = params.iter().map(render_inferred_parameter).collect();
    let ret =
        return_annotation.unwrap_or_else(|| synthesize_return_type(is_async, false).to_string());
    Some(format!(
        "{}({}) => {}",
        generics.unwrap_or_default(),
        rendered.join(", "),
        ret
    ))
}

/// Synthesize the function type of a `function` expression.
fn function_expr_type(expr: &str) -> Option<String> {
    let header = parse_function_header(expr).ok()?;
    let mut params = header.parameters;
    for p in &mut params {
        infer_parameter(p);
    }
    let rendered: Vec<String> = params.iter().map(render_inferred_parameter).collect();
    let ret = header.return_type.unwrap_or_else(|| {
        synthesize_return_type(header.is_async, header.is_generator).to_string()
    });
    Some(format!(
        "{}({}) => {}",
        header.generics.unwrap_or_default(),
        rendered.join(", "),
        ret
    ))
}

/// Render a parameter for a synthesized function type: defaults are
/// dropped in favor of `?`, visibility keywords never appear.
pub(crate) fn render_inferred_parameter(param: &Parameter) -> String {
    let mut out = String::new();
    if param.rest {
        out.push_str("...");
    }
    out.push_str(&param.name);
    if param.optional {
        out.push('?');
    }
    if let Some(ty) = &param.type_annotation {
        out.push_str(": ");
        out.push_str(ty);
    }
    out
}

fn find_top_level_arrow(expr: &str) -> Option<usize> {
    let mut cur = Cursor::new(expr);
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => cur.skip_trivia(),
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    return None;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            b'=' if cur.peek(1) == Some(b'>') => return Some(cur.pos),
            _ => cur.pos += 1,
        }
    }
    None
}

fn needs_parens(ty: &str) -> bool {
    let mut cur = Cursor::new(ty);
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    return false;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            b'|' | b'&' => return true,
            b'=' if cur.peek(1) == Some(b'>') => return true,
            _ => cur.pos += 1,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_narrows_and_let_widens_literals() {
        assert_eq!(infer("'hello'", true), "'hello'");
        assert_eq!(infer("'hello'", false), "string");
        assert_eq!(infer("42", true), "42");
        assert_eq!(infer("42", false), "number");
        assert_eq!(infer("-1", true), "-1");
        assert_eq!(infer("true", false), "boolean");
        assert_eq!(infer("null", true), "null");
        assert_eq!(infer("undefined", false), "undefined");
    }

    #[test]
    fn numeric_breadth() {
        assert_eq!(infer("0x2a", true), "0x2a");
        assert_eq!(infer("0b101", false), "number");
        assert_eq!(infer("1_000_000", false), "number");
        assert_eq!(infer("42n", true), "42n");
        assert_eq!(infer("42n", false), "bigint");
    }

    #[test]
    fn arrays_widen_their_elements() {
        assert_eq!(infer("[1, 2, 3]", true), "number[]");
        assert_eq!(infer("[1, 'a']", true), "(number | string)[]");
        assert_eq!(infer("[]", true), "unknown[]");
    }

    #[test]
    fn objects_widen_property_types() {
        assert_eq!(
            infer("{ name: 'x', count: 1 }", true),
            "{ name: string; count: number }"
        );
    }

    #[test]
    fn as_const_narrows_deeply() {
        assert_eq!(infer("[1, 2] as const", true), "readonly [1, 2]");
        assert_eq!(
            infer("{ kind: 'a', depth: { level: 2 } } as const", true),
            "{ readonly kind: 'a'; readonly depth: { readonly level: 2 } }"
        );
    }

    #[test]
    fn casts_and_satisfies_take_the_type_verbatim() {
        assert_eq!(infer("load() as Config", true), "Config");
        assert_eq!(infer("defaults satisfies Partial<Config>", false), "Partial<Config>");
    }

    #[test]
    fn template_literals() {
        assert_eq!(infer("`plain`", true), "`plain`");
        assert_eq!(infer("`plain`", false), "string");
        assert_eq!(infer("`v${n}`", true), "string");
    }

    #[test]
    fn constructor_expressions_take_the_class() {
        assert_eq!(infer("new Map<string, number>()", true), "Map<string, number>");
        assert_eq!(infer("new URL('http://x')", false), "URL");
    }

    #[test]
    fn arrows_synthesize_function_types() {
        assert_eq!(
            infer("(a: number, b = 2) => a + b", true),
            "(a: number, b?: number) => void"
        );
        assert_eq!(infer("async () => fetch(url)", true), "() => Promise<void>");
    }

    #[test]
    fn unclassifiable_expressions_are_unknown() {
        assert_eq!(infer("someCall()", true), "unknown");
        assert_eq!(infer("a + b", false), "unknown");
    }

    #[test]
    fn return_shapes_come_from_the_prefix() {
        assert_eq!(synthesize_return_type(false, false), "void");
        assert_eq!(synthesize_return_type(true, false), "Promise<void>");
        assert_eq!(
            synthesize_return_type(false, true),
            "Generator<unknown, void, unknown>"
        );
        assert_eq!(
            synthesize_return_type(true, true),
            "AsyncGenerator<unknown, void, unknown>"
        );
    }

    #[test]
    fn parameter_defaults_infer_and_mark_optional() {
        let mut p = Parameter::new("retries");
        p.default_value = Some("3".to_string());
        infer_parameter(&mut p);
        assert_eq!(p.type_annotation.as_deref(), Some("number"));
        assert!(p.optional);

        let mut rest = Parameter::new("args");
        rest.rest = true;
        infer_parameter(&mut rest);
        assert_eq!(rest.type_annotation.as_deref(), Some("unknown[]"));
    }
}
