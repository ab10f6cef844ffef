/**
 * Declaration Header Parsers
 *
 * Small deterministic parsers for the heads of declarations: function
 * signatures, variable bindings, class/interface/enum/namespace headers and
 * import clauses. All of them walk the text with a string/comment-aware
 * cursor and split only on top-level delimiters.
 */
use crate::chars;
use crate::extractor::declaration::{ImportSpecifier, Parameter, Visibility};

// Type-operator keywords that keep the return-type walker in "expecting a
// type" state.
const TYPE_PREFIX_WORDS: &[&str] = &[
    "typeof", "keyof", "readonly", "infer", "new", "abstract", "unique", "asserts",
];

// Infix words that continue a type expression.
const TYPE_INFIX_WORDS: &[&str] = &["extends", "is", "in", "out"];

// Words skipped in front of a braced declaration keyword.
const HEAD_SKIP_WORDS: &[&str] = &["export", "default", "declare", "abstract", "const"];

/// A string/comment-aware cursor over header text.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pub pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Cursor {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    pub fn at(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    /// Skip whitespace and comments.
    pub fn skip_trivia(&mut self) {
        loop {
            match self.at() {
                Some(b) if chars::is_whitespace_byte(b) => self.pos += 1,
                Some(b'/') if self.peek(1) == Some(b'/') => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.pos < self.bytes.len() {
                        if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                    if self.pos > self.bytes.len() {
                        self.pos = self.bytes.len();
                    }
                }
                _ => return,
            }
        }
    }

    /// Read an identifier word at the cursor, or `None`.
    pub fn read_word(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.at() {
            Some(b) if chars::is_identifier_byte(b) && !b.is_ascii_digit() => {}
            _ => return None,
        }
        while self.pos < self.bytes.len() && chars::is_identifier_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        Some(&self.text[start..self.pos])
    }

    /// The identifier word at the cursor without consuming it.
    pub fn peek_word(&self) -> Option<&'a str> {
        let mut probe = Cursor {
            text: self.text,
            bytes: self.bytes,
            pos: self.pos,
        };
        probe.read_word()
    }

    /// Read a dotted name such as `A.B.C`.
    pub fn read_dotted_name(&mut self) -> Option<String> {
        let mut name = String::from(self.read_word()?);
        loop {
            let save = self.pos;
            self.skip_trivia();
            if self.at() == Some(b'.') {
                self.pos += 1;
                self.skip_trivia();
                match self.read_word() {
                    Some(part) => {
                        name.push('.');
                        name.push_str(part);
                    }
                    None => {
                        self.pos = save;
                        break;
                    }
                }
            } else {
                self.pos = save;
                break;
            }
        }
        Some(name)
    }

    /// Read a string literal at the cursor. Returns `(content, raw)`.
    pub fn read_string(&mut self) -> Option<(String, String)> {
        let quote = self.at()?;
        if quote != b'\'' && quote != b'"' {
            return None;
        }
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    let raw = &self.text[start..self.pos.min(self.text.len())];
                    return Some((raw[1..raw.len() - 1].to_string(), raw.to_string()));
                }
                _ => self.pos += 1,
            }
        }
        None
    }

    /// Skip over a string literal; tolerant of unterminated input.
    pub fn skip_string(&mut self) {
        let quote = match self.at() {
            Some(b) => b,
            None => return,
        };
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.bytes.len();
    }

    /// Skip over a template literal, including nested `${…}` expressions.
    pub fn skip_template(&mut self) {
        self.pos += 1;
        let mut expr_depth: i32 = -1; // -1: in text, >=0: brace depth in expression
        let mut nested: Vec<i32> = Vec::new();
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if expr_depth < 0 {
                match b {
                    b'\\' => self.pos += 2,
                    b'`' => {
                        self.pos += 1;
                        match nested.pop() {
                            Some(depth) => expr_depth = depth,
                            None => return,
                        }
                    }
                    b'$' if self.peek(1) == Some(b'{') => {
                        self.pos += 2;
                        expr_depth = 0;
                    }
                    _ => self.pos += 1,
                }
            } else {
                match b {
                    b'\'' | b'"' => self.skip_string(),
                    b'`' => {
                        self.pos += 1;
                        nested.push(expr_depth);
                        expr_depth = -1;
                    }
                    b'{' => {
                        expr_depth += 1;
                        self.pos += 1;
                    }
                    b'}' => {
                        expr_depth -= 1;
                        self.pos += 1;
                        if expr_depth < 0 {
                            // back to template text
                        }
                    }
                    _ => self.pos += 1,
                }
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Skip a regex literal; tolerant at line end.
    pub fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    while self.pos < self.bytes.len()
                        && chars::is_identifier_byte(self.bytes[self.pos])
                    {
                        self.pos += 1;
                    }
                    return;
                }
                b'\n' => return,
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    /// Skip a balanced `(…)`, `[…]` or `{…}` region, cursor on the opener.
    /// Returns false when the close is missing (cursor ends at EOF).
    pub fn skip_balanced(&mut self) -> bool {
        let open = match self.at() {
            Some(b) => b,
            None => return false,
        };
        let close = match open {
            b'(' => b')',
            b'[' => b']',
            b'{' => b'}',
            _ => return false,
        };
        let mut depth = 0i32;
        let mut last_sig: u8 = 0;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\'' | b'"' => {
                    self.skip_string();
                    last_sig = b;
                    continue;
                }
                b'`' => {
                    self.skip_template();
                    last_sig = b;
                    continue;
                }
                b'/' if self.peek(1) == Some(b'/') || self.peek(1) == Some(b'*') => {
                    self.skip_trivia();
                    continue;
                }
                b'/' => {
                    if regex_can_follow(last_sig) {
                        self.skip_regex();
                        last_sig = b')';
                        continue;
                    }
                    last_sig = b;
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    return true;
                }
            }
            if !chars::is_whitespace_byte(b) {
                last_sig = b;
            }
            self.pos += 1;
        }
        false
    }

    /// Skip a balanced generics block, cursor on `<`. `>` characters that
    /// belong to `=>` arrows do not close the block. Returns false when the
    /// close is missing (cursor is restored).
    pub fn skip_angle(&mut self) -> bool {
        let save = self.pos;
        let mut depth = 0i32;
        let mut prev_sig: u8 = 0;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match b {
                b'\'' | b'"' => {
                    self.skip_string();
                    prev_sig = b;
                    continue;
                }
                b'`' => {
                    self.skip_template();
                    prev_sig = b;
                    continue;
                }
                b'/' if self.peek(1) == Some(b'/') || self.peek(1) == Some(b'*') => {
                    self.skip_trivia();
                    continue;
                }
                b'(' | b'[' | b'{' => {
                    if !self.skip_balanced() {
                        self.pos = save;
                        return false;
                    }
                    prev_sig = b')';
                    continue;
                }
                b'<' => depth += 1,
                b'>' if prev_sig == b'=' => {} // arrow
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return true;
                    }
                }
                _ => {}
            }
            if !chars::is_whitespace_byte(b) {
                prev_sig = b;
            }
            self.pos += 1;
        }
        self.pos = save;
        false
    }
}

fn regex_can_follow(last_sig: u8) -> bool {
    last_sig == 0
        || matches!(
            last_sig,
            b',' | b'=' | b'(' | b'[' | b'{' | b':' | b';' | b'!' | b'&' | b'|' | b'?' | b'+'
                | b'-' | b'*' | b'%' | b'<' | b'>'
        )
}

/// Split `text` on top-level occurrences of `sep`, respecting strings,
/// comments, brackets and generics.
pub(crate) fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut cur = Cursor::new(text);
    let mut piece_start = 0;
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => cur.skip_trivia(),
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    break;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            _ if b == sep => {
                parts.push(&text[piece_start..cur.pos]);
                cur.pos += 1;
                piece_start = cur.pos;
            }
            _ => cur.pos += 1,
        }
    }
    parts.push(&text[piece_start..]);
    parts
}

/// Byte position of the first top-level assignment `=` (not `==`, `=>`,
/// `<=`, `>=`, `!=`).
pub(crate) fn find_assignment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut cur = Cursor::new(text);
    let mut prev_sig: u8 = 0;
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => {
                cur.skip_string();
                prev_sig = b;
                continue;
            }
            b'`' => {
                cur.skip_template();
                prev_sig = b;
                continue;
            }
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => {
                cur.skip_trivia();
                continue;
            }
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    return None;
                }
                prev_sig = b')';
                continue;
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                    prev_sig = b'<';
                }
                continue;
            }
            b'=' => {
                let next = bytes.get(cur.pos + 1).copied();
                if next != Some(b'=')
                    && next != Some(b'>')
                    && !matches!(prev_sig, b'!' | b'=' | b'<' | b'>')
                {
                    return Some(cur.pos);
                }
            }
            _ => {}
        }
        if !chars::is_whitespace_byte(b) {
            prev_sig = b;
        }
        cur.pos += 1;
    }
    None
}

/// All top-level positions where `word` appears as a whole identifier.
pub(crate) fn top_level_word_positions(text: &str, word: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut cur = Cursor::new(text);
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => cur.skip_trivia(),
            b'(' | b'[' | b'{' => {
                if !cur.skip_balanced() {
                    break;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            _ if chars::is_identifier_byte(b) => {
                let start = cur.pos;
                match cur.read_word() {
                    Some(w) if w == word => positions.push(start),
                    Some(_) => {}
                    None => cur.pos += 1,
                }
            }
            _ => cur.pos += 1,
        }
    }
    positions
}

/// Byte offset just past any leading decorators (`@name`, `@a.b(args)`).
pub(crate) fn skip_leading_decorators(text: &str) -> usize {
    let mut cur = Cursor::new(text);
    loop {
        cur.skip_trivia();
        if cur.at() != Some(b'@') {
            return cur.pos.min(text.len());
        }
        cur.pos += 1;
        if cur.read_dotted_name().is_none() {
            return cur.pos;
        }
        let save = cur.pos;
        cur.skip_trivia();
        if cur.at() == Some(b'(') {
            if !cur.skip_balanced() {
                return text.len();
            }
        } else {
            cur.pos = save;
        }
    }
}

/// Parsed head of a `function` statement or class method.
#[derive(Debug, Clone)]
pub(crate) struct FunctionHeader {
    pub name: String,
    pub generics: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_generator: bool,
    /// `name?(…)` optional-method marker.
    pub optional: bool,
    /// Offset of the body `{` within the input text, when present.
    pub body_start: Option<usize>,
}

/// Parse a `function` statement head. The text may begin with `export`,
/// `default`, `declare` or `async` keywords.
pub(crate) fn parse_function_header(text: &str) -> Result<FunctionHeader, String> {
    let mut cur = Cursor::new(text);
    let mut is_async = false;
    loop {
        cur.skip_trivia();
        match cur.peek_word() {
            Some("export") | Some("default") | Some("declare") => {
                cur.read_word();
            }
            Some("async") => {
                is_async = true;
                cur.read_word();
            }
            Some("function") => {
                cur.read_word();
                break;
            }
            _ => return Err("expected `function` keyword".to_string()),
        }
    }
    cur.skip_trivia();
    let is_generator = if cur.at() == Some(b'*') {
        cur.pos += 1;
        true
    } else {
        false
    };
    cur.skip_trivia();
    let name = cur.read_word().unwrap_or("").to_string();
    parse_signature_tail(text, cur, name, is_async, is_generator, false)
}

/// Parse the `<generics>(params): ret` tail shared by functions and
/// methods. `cur` stands just past the name.
fn parse_signature_tail(
    text: &str,
    mut cur: Cursor,
    name: String,
    is_async: bool,
    is_generator: bool,
    optional: bool,
) -> Result<FunctionHeader, String> {
    cur.skip_trivia();
    let generics = if cur.at() == Some(b'<') {
        let start = cur.pos;
        if !cur.skip_angle() {
            return Err("unbalanced generic parameter list".to_string());
        }
        Some(text[start..cur.pos].to_string())
    } else {
        None
    };
    cur.skip_trivia();
    if cur.at() != Some(b'(') {
        return Err("expected parameter list".to_string());
    }
    let params_open = cur.pos;
    if !cur.skip_balanced() {
        return Err("unbalanced parameter list".to_string());
    }
    let params_inner = &text[params_open + 1..cur.pos - 1];
    let parameters = parse_parameter_list(params_inner);
    let tail_start = cur.pos;
    let (return_type, body_rel) = split_return_type(&text[tail_start..]);
    Ok(FunctionHeader {
        name,
        generics,
        parameters,
        return_type,
        is_async,
        is_generator,
        optional,
        body_start: body_rel.map(|i| tail_start + i),
    })
}

/// Parse a class member signature: optional accessor keyword, optional `*`,
/// a name, then the shared signature tail.
pub(crate) fn parse_method_header(text: &str) -> Result<FunctionHeader, String> {
    let mut cur = Cursor::new(text);
    cur.skip_trivia();
    let mut is_generator = false;
    if cur.at() == Some(b'*') {
        is_generator = true;
        cur.pos += 1;
        cur.skip_trivia();
    }
    let name = match cur.at() {
        Some(b'#') => {
            cur.pos += 1;
            format!("#{}", cur.read_word().unwrap_or(""))
        }
        Some(b'[') => {
            // Computed name.
            let start = cur.pos;
            if !cur.skip_balanced() {
                return Err("unbalanced computed member name".to_string());
            }
            text[start..cur.pos].to_string()
        }
        Some(b'\'') | Some(b'"') => match cur.read_string() {
            Some((_, raw)) => raw,
            None => return Err("unterminated member name".to_string()),
        },
        _ => cur.read_word().unwrap_or("").to_string(),
    };
    if name.is_empty() {
        return Err("expected member name".to_string());
    }
    cur.skip_trivia();
    let mut optional = false;
    if cur.at() == Some(b'?') {
        optional = true;
        cur.pos += 1;
    }
    parse_signature_tail(text, cur, name, false, is_generator, optional)
}

/// Return-type extraction from the text following a parameter list. Walks a
/// type expression distinguishing object-type braces from the body brace.
pub(crate) fn split_return_type(rest: &str) -> (Option<String>, Option<usize>) {
    let mut cur = Cursor::new(rest);
    cur.skip_trivia();
    match cur.at() {
        Some(b':') => {}
        Some(b'{') => return (None, Some(cur.pos)),
        Some(b';') | None => return (None, None),
        _ => {
            // No annotation; locate the body if any.
            while let Some(b) = cur.at() {
                match b {
                    b'\'' | b'"' => cur.skip_string(),
                    b'`' => cur.skip_template(),
                    b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => {
                        cur.skip_trivia()
                    }
                    b'(' | b'[' => {
                        if !cur.skip_balanced() {
                            return (None, None);
                        }
                    }
                    b'{' => return (None, Some(cur.pos)),
                    b';' => return (None, None),
                    _ => cur.pos += 1,
                }
            }
            return (None, None);
        }
    }
    cur.pos += 1; // ':'
    cur.skip_trivia();
    let type_start = cur.pos;
    let mut type_end = cur.pos;
    let mut expecting = true;
    while let Some(b) = cur.at() {
        if chars::is_whitespace_byte(b) {
            cur.pos += 1;
            continue;
        }
        if b == b'/' && (cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*')) {
            cur.skip_trivia();
            continue;
        }
        if expecting {
            match b {
                b'{' | b'(' | b'[' => {
                    if !cur.skip_balanced() {
                        break;
                    }
                    expecting = false;
                }
                b'\'' | b'"' => {
                    cur.skip_string();
                    expecting = false;
                }
                b'`' => {
                    cur.skip_template();
                    expecting = false;
                }
                b'|' | b'&' => cur.pos += 1,
                b'-' => cur.pos += 1,
                _ if b.is_ascii_digit() => {
                    while cur
                        .at()
                        .map(|c| chars::is_identifier_byte(c) || c == b'.')
                        .unwrap_or(false)
                    {
                        cur.pos += 1;
                    }
                    expecting = false;
                }
                _ if chars::is_identifier_byte(b) => {
                    let word = cur.read_word().unwrap_or("");
                    if !TYPE_PREFIX_WORDS.contains(&word) {
                        expecting = false;
                    }
                }
                _ => break,
            }
            type_end = cur.pos;
        } else {
            match b {
                b'|' | b'&' | b'.' => {
                    cur.pos += 1;
                    expecting = true;
                }
                b'[' => {
                    if !cur.skip_balanced() {
                        break;
                    }
                }
                b'<' => {
                    if !cur.skip_angle() {
                        break;
                    }
                }
                b'=' if cur.peek(1) == Some(b'>') => {
                    cur.pos += 2;
                    expecting = true;
                }
                b'?' | b':' => {
                    cur.pos += 1;
                    expecting = true;
                }
                b'(' => {
                    if !cur.skip_balanced() {
                        break;
                    }
                }
                b'{' => break,
                b';' => {
                    let ty = rest[type_start..type_end].trim();
                    return (non_empty(ty), None);
                }
                _ if chars::is_identifier_byte(b) => match cur.peek_word() {
                    Some(w) if TYPE_INFIX_WORDS.contains(&w) => {
                        cur.read_word();
                        expecting = true;
                    }
                    _ => break,
                },
                _ => break,
            }
            type_end = cur.pos;
        }
    }
    let ty = rest[type_start..type_end].trim();
    cur.pos = type_end;
    cur.skip_trivia();
    let body = if cur.at() == Some(b'{') { Some(cur.pos) } else { None };
    (non_empty(ty), body)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse one parameter text into a `Parameter`.
pub(crate) fn parse_parameter(text: &str) -> Parameter {
    let offset = skip_leading_decorators(text);
    let text = &text[offset..];
    let mut cur = Cursor::new(text);
    let mut param = Parameter::new("");
    loop {
        cur.skip_trivia();
        let save = cur.pos;
        match cur.peek_word() {
            Some(word @ ("public" | "private" | "protected" | "readonly" | "override")) => {
                cur.read_word();
                let mut probe = Cursor::new(text);
                probe.pos = cur.pos;
                probe.skip_trivia();
                // A bare modifier word can itself be the parameter name.
                let is_modifier = matches!(
                    probe.at(),
                    Some(b) if chars::is_identifier_byte(b) || b == b'.' || b == b'{' || b == b'['
                );
                if !is_modifier {
                    cur.pos = save;
                    break;
                }
                match word {
                    "public" => param.visibility = Some(Visibility::Public),
                    "private" => param.visibility = Some(Visibility::Private),
                    "protected" => param.visibility = Some(Visibility::Protected),
                    "readonly" => param.readonly = true,
                    _ => {}
                }
            }
            _ => break,
        }
    }
    cur.skip_trivia();
    if cur.at() == Some(b'.') && cur.peek(1) == Some(b'.') && cur.peek(2) == Some(b'.') {
        param.rest = true;
        cur.pos += 3;
        cur.skip_trivia();
    }
    match cur.at() {
        Some(b'{') | Some(b'[') => {
            let start = cur.pos;
            if cur.skip_balanced() {
                param.name = text[start..cur.pos].to_string();
            } else {
                param.name = text[start..].trim_end().to_string();
                return param;
            }
        }
        _ => {
            param.name = cur.read_word().unwrap_or("").to_string();
        }
    }
    cur.skip_trivia();
    if cur.at() == Some(b'?') {
        param.optional = true;
        cur.pos += 1;
        cur.skip_trivia();
    }
    if cur.at() == Some(b':') {
        cur.pos += 1;
        let rest = &text[cur.pos..];
        match find_assignment(rest) {
            Some(eq) => {
                param.type_annotation = non_empty(rest[..eq].trim());
                param.default_value = non_empty(rest[eq + 1..].trim());
            }
            None => param.type_annotation = non_empty(rest.trim()),
        }
    } else if cur.at() == Some(b'=') {
        cur.pos += 1;
        param.default_value = non_empty(text[cur.pos..].trim());
    }
    param
}

/// Split a parameter list body on top-level commas and parse each entry.
pub(crate) fn parse_parameter_list(inner: &str) -> Vec<Parameter> {
    split_top_level(inner, b',')
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .map(parse_parameter)
        .collect()
}

/// One binding of a variable statement.
#[derive(Debug, Clone)]
pub(crate) struct VariableBinding {
    pub name: String,
    pub annotation: Option<String>,
    pub initializer: Option<String>,
}

/// Parse the bindings of a variable statement; `text` follows the
/// `const`/`let`/`var` keyword.
pub(crate) fn parse_variable_bindings(text: &str) -> Vec<VariableBinding> {
    let text = text.trim().trim_end_matches(';').trim_end();
    let mut bindings = Vec::new();
    for piece in split_top_level(text, b',') {
        let raw = piece.trim();
        if raw.is_empty() {
            continue;
        }
        let mut cur = Cursor::new(raw);
        cur.skip_trivia();
        let name = match cur.at() {
            Some(b'{') | Some(b'[') => {
                let start = cur.pos;
                if cur.skip_balanced() {
                    raw[start..cur.pos].to_string()
                } else {
                    raw.to_string()
                }
            }
            _ => cur.read_word().unwrap_or("").to_string(),
        };
        cur.skip_trivia();
        if cur.at() == Some(b'!') {
            cur.pos += 1;
            cur.skip_trivia();
        }
        let mut annotation = None;
        let mut initializer = None;
        if cur.at() == Some(b':') {
            cur.pos += 1;
            let rest = &raw[cur.pos..];
            match find_assignment(rest) {
                Some(eq) => {
                    annotation = non_empty(rest[..eq].trim());
                    initializer = non_empty(rest[eq + 1..].trim());
                }
                None => annotation = non_empty(rest.trim()),
            }
        } else if cur.at() == Some(b'=') {
            cur.pos += 1;
            initializer = non_empty(raw[cur.pos..].trim());
        }
        bindings.push(VariableBinding {
            name,
            annotation,
            initializer,
        });
    }
    bindings
}

/// Parsed head of a braced declaration (class, interface, enum, namespace,
/// module).
#[derive(Debug, Clone)]
pub(crate) struct BracedHeader {
    pub name: String,
    pub generics: Option<String>,
    pub extends: Vec<String>,
    pub implements: Vec<String>,
    /// Inner body byte range within the input text, braces excluded.
    pub body: Option<(usize, usize)>,
}

/// Parse the head of a braced declaration. `keyword` is one of `class`,
/// `interface`, `enum`, `namespace`, `module`.
pub(crate) fn parse_braced_header(text: &str, keyword: &str) -> Result<BracedHeader, String> {
    let mut cur = Cursor::new(text);
    loop {
        cur.skip_trivia();
        match cur.peek_word() {
            Some(w) if w == keyword => {
                cur.read_word();
                break;
            }
            Some(w) if HEAD_SKIP_WORDS.contains(&w) => {
                cur.read_word();
            }
            _ => return Err(format!("expected `{}` keyword", keyword)),
        }
    }
    cur.skip_trivia();
    let name = match cur.at() {
        Some(b'\'') | Some(b'"') => match cur.read_string() {
            Some((_, raw)) => raw,
            None => return Err("unterminated module name".to_string()),
        },
        _ => cur.read_dotted_name().unwrap_or_default(),
    };
    cur.skip_trivia();
    let generics = if cur.at() == Some(b'<') {
        let start = cur.pos;
        if !cur.skip_angle() {
            return Err("unbalanced generic parameter list".to_string());
        }
        Some(text[start..cur.pos].to_string())
    } else {
        None
    };
    let mut extends = Vec::new();
    let mut implements = Vec::new();
    loop {
        cur.skip_trivia();
        match cur.peek_word() {
            Some("extends") => {
                cur.read_word();
                let clause = capture_clause(text, &mut cur, &["implements"]);
                extends = split_type_list(&clause);
            }
            Some("implements") => {
                cur.read_word();
                let clause = capture_clause(text, &mut cur, &["extends"]);
                implements = split_type_list(&clause);
            }
            _ => break,
        }
    }
    cur.skip_trivia();
    let body = match cur.at() {
        Some(b'{') => {
            let open = cur.pos;
            if !cur.skip_balanced() {
                return Err("unbalanced declaration body".to_string());
            }
            Some((open + 1, cur.pos - 1))
        }
        _ => None,
    };
    Ok(BracedHeader {
        name,
        generics,
        extends,
        implements,
        body,
    })
}

/// Capture clause text up to the body `{`, a stop word, or end of input.
fn capture_clause(text: &str, cur: &mut Cursor, stop_words: &[&str]) -> String {
    cur.skip_trivia();
    let start = cur.pos;
    let mut end = cur.pos;
    while let Some(b) = cur.at() {
        match b {
            b'\'' | b'"' => cur.skip_string(),
            b'`' => cur.skip_template(),
            b'/' if cur.peek(1) == Some(b'/') || cur.peek(1) == Some(b'*') => cur.skip_trivia(),
            b'(' | b'[' => {
                if !cur.skip_balanced() {
                    break;
                }
            }
            b'<' => {
                if !cur.skip_angle() {
                    cur.pos += 1;
                }
            }
            b'{' => break,
            _ if chars::is_identifier_byte(b) => match cur.peek_word() {
                Some(w) if stop_words.contains(&w) => break,
                Some(_) => {
                    cur.read_word();
                }
                None => cur.pos += 1,
            },
            _ => cur.pos += 1,
        }
        end = cur.pos;
    }
    cur.pos = end;
    text[start..end].trim().to_string()
}

fn split_type_list(clause: &str) -> Vec<String> {
    split_top_level(clause, b',')
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parsed head of an `import` statement.
#[derive(Debug, Clone, Default)]
pub(crate) struct ImportHeader {
    pub default_import: Option<String>,
    pub namespace_import: Option<String>,
    pub specifiers: Vec<ImportSpecifier>,
    /// `(unquoted, as_written)`.
    pub source: Option<(String, String)>,
    pub is_type_only: bool,
    pub is_side_effect: bool,
    /// `import X = require('m')` form; emitted verbatim.
    pub is_equals: bool,
}

pub(crate) fn parse_import(text: &str) -> Result<ImportHeader, String> {
    let mut cur = Cursor::new(text);
    cur.skip_trivia();
    if cur.peek_word() != Some("import") {
        return Err("expected `import` keyword".to_string());
    }
    cur.read_word();
    cur.skip_trivia();
    let mut header = ImportHeader::default();

    if matches!(cur.at(), Some(b'\'') | Some(b'"')) {
        header.source = cur.read_string();
        header.is_side_effect = true;
        return Ok(header);
    }

    if cur.peek_word() == Some("type") {
        let save = cur.pos;
        cur.read_word();
        cur.skip_trivia();
        // `import type from 'm'` imports a binding named `type`; any other
        // continuation marks the whole clause type-only.
        if cur.peek_word() == Some("from") {
            cur.pos = save;
        } else {
            header.is_type_only = true;
        }
    }

    cur.skip_trivia();
    if let Some(b) = cur.at() {
        if chars::is_identifier_byte(b) && !b.is_ascii_digit() {
            let name = cur.read_word().unwrap_or("").to_string();
            cur.skip_trivia();
            if cur.at() == Some(b'=') {
                // import X = require('m')
                header.is_equals = true;
                header.default_import = Some(name);
                cur.pos += 1;
                cur.skip_trivia();
                if cur.peek_word() == Some("require") {
                    cur.read_word();
                    cur.skip_trivia();
                    if cur.at() == Some(b'(') {
                        cur.pos += 1;
                        cur.skip_trivia();
                        header.source = cur.read_string();
                    }
                }
                return Ok(header);
            }
            header.default_import = Some(name);
            if cur.at() == Some(b',') {
                cur.pos += 1;
                cur.skip_trivia();
            }
        }
    }

    match cur.at() {
        Some(b'*') => {
            cur.pos += 1;
            cur.skip_trivia();
            if cur.peek_word() == Some("as") {
                cur.read_word();
                cur.skip_trivia();
                header.namespace_import = cur.read_word().map(str::to_string);
            }
        }
        Some(b'{') => {
            let open = cur.pos;
            if !cur.skip_balanced() {
                return Err("unbalanced import clause".to_string());
            }
            let inner = &text[open + 1..cur.pos - 1];
            header.specifiers = parse_specifier_list(inner);
        }
        _ => {}
    }

    cur.skip_trivia();
    if cur.peek_word() == Some("from") {
        cur.read_word();
        cur.skip_trivia();
        header.source = cur.read_string();
    }
    if header.source.is_none() && !header.is_side_effect {
        return Err("missing module specifier".to_string());
    }
    Ok(header)
}

/// Parsed head of an `export` clause statement (`export { … }`,
/// `export * from '…'`).
#[derive(Debug, Clone, Default)]
pub(crate) struct ExportHeader {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: Option<(String, String)>,
    pub is_type_only: bool,
    pub star_alias: Option<String>,
}

pub(crate) fn parse_export_clause(text: &str) -> Result<ExportHeader, String> {
    let mut cur = Cursor::new(text);
    cur.skip_trivia();
    if cur.peek_word() != Some("export") {
        return Err("expected `export` keyword".to_string());
    }
    cur.read_word();
    cur.skip_trivia();
    let mut header = ExportHeader::default();
    if cur.peek_word() == Some("type") {
        cur.read_word();
        header.is_type_only = true;
        cur.skip_trivia();
    }
    match cur.at() {
        Some(b'*') => {
            cur.pos += 1;
            cur.skip_trivia();
            if cur.peek_word() == Some("as") {
                cur.read_word();
                cur.skip_trivia();
                header.star_alias = cur.read_word().map(str::to_string);
            }
        }
        Some(b'{') => {
            let open = cur.pos;
            if !cur.skip_balanced() {
                return Err("unbalanced export clause".to_string());
            }
            header.specifiers = parse_specifier_list(&text[open + 1..cur.pos - 1]);
        }
        _ => return Err("expected export clause".to_string()),
    }
    cur.skip_trivia();
    if cur.peek_word() == Some("from") {
        cur.read_word();
        cur.skip_trivia();
        header.source = cur.read_string();
    }
    Ok(header)
}

fn parse_specifier_list(inner: &str) -> Vec<ImportSpecifier> {
    let mut specifiers = Vec::new();
    for piece in split_top_level(inner, b',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let mut cur = Cursor::new(piece);
        cur.skip_trivia();
        let mut is_type = false;
        if cur.peek_word() == Some("type") {
            let save = cur.pos;
            cur.read_word();
            cur.skip_trivia();
            // `{ type }` and `{ type as t }` bind the name `type` itself.
            match cur.peek_word() {
                Some("as") | None => cur.pos = save,
                Some(_) => is_type = true,
            }
        }
        cur.skip_trivia();
        let name = match cur.at() {
            Some(b'\'') | Some(b'"') => match cur.read_string() {
                Some((_, raw)) => raw,
                None => continue,
            },
            _ => match cur.read_word() {
                Some(w) => w.to_string(),
                None => continue,
            },
        };
        let mut spec = ImportSpecifier::new(name);
        spec.is_type = is_type;
        cur.skip_trivia();
        if cur.peek_word() == Some("as") {
            cur.read_word();
            cur.skip_trivia();
            if let Some(alias) = cur.read_word() {
                spec = spec.with_alias(alias);
            }
        }
        specifiers.push(spec);
    }
    specifiers
}
