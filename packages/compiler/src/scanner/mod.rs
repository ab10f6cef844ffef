/**
 * Source Scanner
 *
 * Single forward pass over TypeScript source that yields top-level spans:
 * statements, comment blocks, directive prologue entries and blank-line
 * markers. The scanner tracks bracket depths and lexical mode (strings,
 * templates, comments, regex literals) but knows nothing about declaration
 * shapes.
 */
use smallvec::SmallVec;

use crate::chars;
use crate::error::ScanError;

/// Tag of one emitted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A top-level statement, byte-accurate over the original source.
    Statement,
    /// A comment block that may attach to the next statement.
    Comment,
    /// A directive-prologue entry (`'use strict'`-style string statement).
    Directive,
    /// A blank line; breaks comment attachment. Zero-width.
    Blank,
}

/// One span over the source. Offsets are byte offsets into the original
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Span { kind, start, end }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Scan output: the span sequence plus any unterminated-token errors.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub spans: Vec<Span>,
    pub errors: Vec<ScanError>,
}

/// A statement span with its attached leading comments, ready for the
/// extractor.
#[derive(Debug, Clone)]
pub struct StatementSpan {
    pub start: usize,
    pub end: usize,
    pub leading_comments: Vec<String>,
}

impl StatementSpan {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Scan `source` into top-level spans.
pub fn scan(source: &str) -> ScanResult {
    Scanner::new(source).run()
}

/// Attach comment spans to their following statements. A blank line or a
/// directive breaks attachment. When `retain_comments` is false the comment
/// text is discarded but span boundaries are unaffected.
pub fn statements(source: &str, result: &ScanResult, retain_comments: bool) -> Vec<StatementSpan> {
    let mut out = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for span in &result.spans {
        match span.kind {
            SpanKind::Comment => {
                if retain_comments {
                    pending.push(span.text(source).trim_end().to_string());
                }
            }
            SpanKind::Blank | SpanKind::Directive => pending.clear(),
            SpanKind::Statement => {
                out.push(StatementSpan {
                    start: span.start,
                    end: span.end,
                    leading_comments: std::mem::take(&mut pending),
                });
            }
        }
    }
    out
}

// Words that keep a statement open when they are the last token before a
// newline.
const CONTINUATION_TAIL_WORDS: &[&str] = &[
    "as", "satisfies", "extends", "implements", "in", "instanceof", "keyof", "typeof", "infer",
    "new", "return", "yield", "await", "do", "else", "case", "export", "default", "declare",
    "abstract", "async", "static", "public", "private", "protected", "readonly", "const", "let",
    "var", "function", "class", "interface", "enum", "namespace", "module", "type", "get", "set",
    "is", "asserts",
];

// Words that splice the next token run onto the current statement. `from`
// keeps `export { … } from '…'` clauses attached to their brace.
const CONTINUATION_HEAD_WORDS: &[&str] = &[
    "as", "satisfies", "else", "catch", "finally", "while", "extends", "implements", "instanceof",
    "in", "from",
];

// Keywords after which `/` begins a regular expression, even though the
// preceding byte looks like the end of a value.
const REGEX_PRECEDING_WORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "yield", "await", "do",
    "else", "case",
];

// Statement-head keywords used to force a boundary when `<` depth tracking
// was poisoned by a comparison operator.
const STATEMENT_HEAD_WORDS: &[&str] = &[
    "import", "export", "declare", "const", "let", "var", "function", "class", "interface",
    "type", "enum", "namespace", "module", "abstract", "async",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateFrame {
    /// Inside template text, waiting for the closing backtick.
    Text,
    /// Inside a `${…}` expression, carrying its brace depth.
    Expr(i32),
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    len: usize,
    pos: usize,
    spans: Vec<Span>,
    errors: Vec<ScanError>,
    stmt_start: Option<usize>,
    paren: i32,
    bracket: i32,
    brace: i32,
    angle: i32,
    prev_sig: u8,
    last_sig: u8,
    last_content_end: usize,
    newlines: u32,
    in_prologue: bool,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            src: source,
            bytes: source.as_bytes(),
            len: source.len(),
            pos: 0,
            spans: Vec::new(),
            errors: Vec::new(),
            stmt_start: None,
            paren: 0,
            bracket: 0,
            brace: 0,
            angle: 0,
            prev_sig: 0,
            last_sig: 0,
            last_content_end: 0,
            newlines: 0,
            in_prologue: true,
        }
    }

    fn run(mut self) -> ScanResult {
        self.skip_shebang();
        while self.pos < self.len {
            let b = self.bytes[self.pos];
            if self.stmt_start.is_none() {
                self.scan_between(b);
            } else {
                self.scan_in_statement(b);
            }
        }
        if let Some(start) = self.stmt_start.take() {
            let end = self.last_content_end.max(start);
            self.push_statement(start, end);
        }
        ScanResult {
            spans: self.spans,
            errors: self.errors,
        }
    }

    fn skip_shebang(&mut self) {
        if self.bytes.starts_with(b"#!") {
            while self.pos < self.len && self.bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
        }
    }

    // --- between statements ---

    fn scan_between(&mut self, b: u8) {
        match b {
            b'\n' => {
                self.newlines += 1;
                if self.newlines == 2 {
                    self.spans.push(Span::new(SpanKind::Blank, self.pos, self.pos));
                }
                self.pos += 1;
            }
            _ if chars::is_whitespace_byte(b) => self.pos += 1,
            b'/' if self.peek(1) == Some(b'/') => {
                let start = self.pos;
                while self.pos < self.len && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                self.spans.push(Span::new(SpanKind::Comment, start, self.pos));
                self.newlines = 0;
            }
            b'/' if self.peek(1) == Some(b'*') => {
                let start = self.pos;
                match self.find_block_comment_end(start) {
                    Some(end) => {
                        self.pos = end;
                        self.spans.push(Span::new(SpanKind::Comment, start, end));
                        self.newlines = 0;
                    }
                    None => {
                        self.errors.push(ScanError::comment(start));
                        self.pos = self.len;
                    }
                }
            }
            b';' => {
                // Empty statement.
                self.pos += 1;
                self.newlines = 0;
            }
            _ => {
                self.stmt_start = Some(self.pos);
                self.newlines = 0;
                self.prev_sig = 0;
                self.last_sig = 0;
                self.last_content_end = self.pos;
            }
        }
    }

    // --- inside a statement ---

    fn scan_in_statement(&mut self, b: u8) {
        match b {
            b'\'' | b'"' => {
                let start = self.pos;
                if let Err(err) = self.consume_string(b) {
                    self.recover(err, start);
                } else {
                    self.mark_value_end(b);
                }
            }
            b'`' => {
                let start = self.pos;
                if let Err(err) = self.consume_template() {
                    self.recover(err, start);
                } else {
                    self.mark_value_end(b'`');
                }
            }
            b'/' if self.peek(1) == Some(b'/') => {
                while self.pos < self.len && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            }
            b'/' if self.peek(1) == Some(b'*') => {
                let start = self.pos;
                match self.find_block_comment_end(start) {
                    Some(end) => self.pos = end,
                    None => self.recover(ScanError::comment(start), start),
                }
            }
            b'/' => {
                if self.regex_can_start() {
                    let start = self.pos;
                    if let Err(err) = self.consume_regex() {
                        self.recover(err, start);
                    } else {
                        self.mark_value_end(b')');
                    }
                } else {
                    self.significant(b'/');
                }
            }
            b'(' => {
                self.paren += 1;
                self.significant(b);
            }
            b')' => {
                self.paren = (self.paren - 1).max(0);
                self.significant(b);
            }
            b'[' => {
                self.bracket += 1;
                self.significant(b);
            }
            b']' => {
                self.bracket = (self.bracket - 1).max(0);
                self.significant(b);
            }
            b'{' => {
                self.brace += 1;
                self.significant(b);
            }
            b'}' => {
                self.brace = (self.brace - 1).max(0);
                self.significant(b);
                if self.depths_zero() {
                    self.maybe_end_after_brace();
                }
            }
            b';' => {
                if self.paren == 0 && self.bracket == 0 && self.brace == 0 {
                    self.angle = 0;
                    let start = self.stmt_start.take().unwrap_or(self.pos);
                    self.pos += 1;
                    self.push_statement(start, self.pos);
                } else {
                    self.significant(b);
                }
            }
            b'<' => {
                // Type-argument position only: previous significant byte is
                // an identifier byte or `>`. `<=` and `<<` are operators.
                let next = self.peek(1);
                if next != Some(b'=')
                    && next != Some(b'<')
                    && (chars::is_identifier_byte(self.last_sig) || self.last_sig == b'>')
                {
                    self.angle += 1;
                }
                self.significant(b);
            }
            b'>' => {
                if self.last_sig != b'=' && self.angle > 0 {
                    self.angle -= 1;
                }
                self.significant(b);
            }
            b'\n' => {
                self.handle_statement_newline();
                self.pos += 1;
            }
            _ if chars::is_whitespace_byte(b) => self.pos += 1,
            _ => self.significant(b),
        }
    }

    fn significant(&mut self, b: u8) {
        self.prev_sig = self.last_sig;
        self.last_sig = b;
        self.pos += 1;
        self.last_content_end = self.pos;
    }

    /// Record the end of a scanned value (string, template, regex) without
    /// advancing; the consume fns already moved the cursor.
    fn mark_value_end(&mut self, marker: u8) {
        self.prev_sig = self.last_sig;
        self.last_sig = marker;
        self.last_content_end = self.pos;
    }

    fn depths_zero(&self) -> bool {
        self.paren == 0 && self.bracket == 0 && self.brace == 0 && self.angle == 0
    }

    fn recover(&mut self, err: ScanError, _start: usize) {
        self.errors.push(err);
        self.stmt_start = None;
        self.paren = 0;
        self.bracket = 0;
        self.brace = 0;
        self.angle = 0;
        self.prev_sig = 0;
        self.last_sig = 0;
        self.newlines = 0;
    }

    fn push_statement(&mut self, start: usize, end: usize) {
        if end <= start {
            self.reset_after_statement();
            return;
        }
        let kind = if self.in_prologue && is_string_statement(&self.src[start..end]) {
            SpanKind::Directive
        } else {
            self.in_prologue = false;
            SpanKind::Statement
        };
        self.spans.push(Span::new(kind, start, end));
        self.reset_after_statement();
    }

    fn reset_after_statement(&mut self) {
        self.stmt_start = None;
        self.angle = 0;
        self.prev_sig = 0;
        self.last_sig = 0;
        self.newlines = 0;
    }

    fn handle_statement_newline(&mut self) {
        if self.last_sig == 0 {
            return;
        }
        let brackets_zero = self.paren == 0 && self.bracket == 0 && self.brace == 0;
        if !brackets_zero {
            return;
        }
        if self.angle > 0 {
            // A comparison operator can poison `<` depth; force a boundary
            // when the next line unambiguously starts a declaration.
            if !self.continuation_tail() && self.next_line_is_statement_head() {
                self.angle = 0;
                let start = self.stmt_start.take().unwrap_or(self.pos);
                let end = self.last_content_end.max(start);
                self.push_statement(start, end);
            }
            return;
        }
        if self.continuation_tail() || self.continuation_head() {
            return;
        }
        let start = self.stmt_start.take().unwrap_or(self.pos);
        let end = self.last_content_end.max(start);
        self.push_statement(start, end);
    }

    fn maybe_end_after_brace(&mut self) {
        match self.next_significant(self.pos) {
            Some(i) => {
                let b = self.bytes[i];
                if b == b';' || is_continuation_head_byte(b) {
                    return;
                }
                if chars::is_identifier_byte(b) {
                    let word = self.word_at(i);
                    if CONTINUATION_HEAD_WORDS.contains(&word) {
                        return;
                    }
                }
                let start = self.stmt_start.take().unwrap_or(self.pos);
                self.push_statement(start, self.pos);
            }
            None => {
                let start = self.stmt_start.take().unwrap_or(self.pos);
                self.push_statement(start, self.pos);
            }
        }
    }

    fn continuation_tail(&self) -> bool {
        let b = self.last_sig;
        if b == b'=' && self.prev_sig == b'>' {
            // `>=` comparison; still incomplete.
            return true;
        }
        if matches!(
            b,
            b',' | b'+'
                | b'-'
                | b'*'
                | b'/'
                | b'%'
                | b'&'
                | b'|'
                | b'^'
                | b'='
                | b'<'
                | b'?'
                | b':'
                | b'.'
                | b'('
                | b'['
                | b'{'
        ) {
            return true;
        }
        if b == b'>' && self.prev_sig == b'=' {
            // Arrow `=>` awaiting its body.
            return true;
        }
        if chars::is_identifier_byte(b) {
            let word = self.word_ending_at(self.last_content_end);
            return CONTINUATION_TAIL_WORDS.contains(&word);
        }
        false
    }

    fn continuation_head(&self) -> bool {
        match self.next_significant(self.pos + 1) {
            Some(i) => {
                let b = self.bytes[i];
                if is_continuation_head_byte(b) {
                    return true;
                }
                if chars::is_identifier_byte(b) {
                    let word = self.word_at(i);
                    return CONTINUATION_HEAD_WORDS.contains(&word);
                }
                false
            }
            None => false,
        }
    }

    fn next_line_is_statement_head(&self) -> bool {
        match self.next_significant(self.pos + 1) {
            Some(i) if chars::is_identifier_byte(self.bytes[i]) => {
                STATEMENT_HEAD_WORDS.contains(&self.word_at(i))
            }
            _ => false,
        }
    }

    /// Next significant byte position at or after `from`, skipping
    /// whitespace and comments. Pure lookahead; never mutates.
    fn next_significant(&self, mut from: usize) -> Option<usize> {
        while from < self.len {
            let b = self.bytes[from];
            if chars::is_whitespace_byte(b) {
                from += 1;
            } else if b == b'/' && from + 1 < self.len && self.bytes[from + 1] == b'/' {
                while from < self.len && self.bytes[from] != b'\n' {
                    from += 1;
                }
            } else if b == b'/' && from + 1 < self.len && self.bytes[from + 1] == b'*' {
                match find_subslice(self.bytes, b"*/", from + 2) {
                    Some(end) => from = end + 2,
                    None => return None,
                }
            } else {
                return Some(from);
            }
        }
        None
    }

    fn word_at(&self, start: usize) -> &'a str {
        let mut end = start;
        while end < self.len && chars::is_identifier_byte(self.bytes[end]) {
            end += 1;
        }
        &self.src[start..end]
    }

    fn word_ending_at(&self, end: usize) -> &'a str {
        let mut start = end;
        while start > 0 && chars::is_identifier_byte(self.bytes[start - 1]) {
            start -= 1;
        }
        &self.src[start..end]
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn regex_can_start(&self) -> bool {
        let b = self.last_sig;
        if b == 0 {
            return true;
        }
        if chars::is_identifier_byte(b) {
            let word = self.word_ending_at(self.last_content_end);
            return REGEX_PRECEDING_WORDS.contains(&word);
        }
        // After a value-ending byte `/` is division.
        !matches!(b, b')' | b']' | b'}' | b'\'' | b'"' | b'`')
    }

    fn find_block_comment_end(&self, start: usize) -> Option<usize> {
        find_subslice(self.bytes, b"*/", start + 2).map(|i| i + 2)
    }

    // --- nested token consumers; `pos` stands on the opening byte ---

    fn consume_string(&mut self, quote: u8) -> Result<(), ScanError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.len {
            let b = self.bytes[self.pos];
            match b {
                b'\\' => self.pos += 2,
                b'\n' => return Err(ScanError::string(start)),
                _ if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.len;
        Err(ScanError::string(start))
    }

    fn consume_template(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        self.pos += 1;
        let mut frames: SmallVec<[TemplateFrame; 4]> = SmallVec::new();
        frames.push(TemplateFrame::Text);
        while self.pos < self.len {
            match frames.last().copied() {
                Some(TemplateFrame::Text) => {
                    let b = self.bytes[self.pos];
                    match b {
                        b'\\' => self.pos += 2,
                        b'`' => {
                            self.pos += 1;
                            frames.pop();
                            if frames.is_empty() {
                                return Ok(());
                            }
                        }
                        b'$' if self.peek(1) == Some(b'{') => {
                            self.pos += 2;
                            frames.push(TemplateFrame::Expr(0));
                        }
                        _ => self.pos += 1,
                    }
                }
                Some(TemplateFrame::Expr(depth)) => {
                    let b = self.bytes[self.pos];
                    match b {
                        b'\'' | b'"' => self.consume_string(b)?,
                        b'`' => {
                            self.pos += 1;
                            frames.push(TemplateFrame::Text);
                        }
                        b'/' if self.peek(1) == Some(b'/') => {
                            while self.pos < self.len && self.bytes[self.pos] != b'\n' {
                                self.pos += 1;
                            }
                        }
                        b'/' if self.peek(1) == Some(b'*') => match self.find_block_comment_end(self.pos) {
                            Some(end) => self.pos = end,
                            None => return Err(ScanError::comment(self.pos)),
                        },
                        b'{' => {
                            self.pos += 1;
                            *frames.last_mut().unwrap() = TemplateFrame::Expr(depth + 1);
                        }
                        b'}' => {
                            self.pos += 1;
                            if depth == 0 {
                                frames.pop();
                            } else {
                                *frames.last_mut().unwrap() = TemplateFrame::Expr(depth - 1);
                            }
                        }
                        _ => self.pos += 1,
                    }
                }
                None => break,
            }
        }
        self.pos = self.len;
        Err(ScanError::template(start))
    }

    fn consume_regex(&mut self) -> Result<(), ScanError> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        while self.pos < self.len {
            let b = self.bytes[self.pos];
            match b {
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
                    while self.pos < self.len && chars::is_identifier_byte(self.bytes[self.pos]) {
                        self.pos += 1;
                    }
                    return Ok(());
                }
                b'\n' => return Err(ScanError::regex(start)),
                _ => self.pos += 1,
            }
        }
        self.pos = self.len;
        Err(ScanError::regex(start))
    }
}

// `*` is absent: a line that begins with `*` is a generator member, not a
// split multiplication.
fn is_continuation_head_byte(b: u8) -> bool {
    matches!(
        b,
        b'.' | b'+'
            | b'-'
            | b'/'
            | b'%'
            | b'&'
            | b'|'
            | b'^'
            | b'='
            | b'<'
            | b'>'
            | b'?'
            | b':'
            | b','
            | b')'
            | b']'
            | b'}'
            | b'('
            | b'['
            | b'`'
    )
}

fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// True when the trimmed statement text is a lone string literal (with an
/// optional trailing semicolon).
fn is_string_statement(text: &str) -> bool {
    let trimmed = text.trim().trim_end_matches(';').trim_end();
    let bytes = trimmed.as_bytes();
    if bytes.len() < 2 {
        return false;
    }
    let quote = bytes[0];
    if quote != b'\'' && quote != b'"' {
        return false;
    }
    if bytes[bytes.len() - 1] != quote {
        return false;
    }
    // No unescaped closing quote before the end.
    let mut i = 1;
    while i < bytes.len() - 1 {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return false,
            _ => i += 1,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement_texts(source: &str) -> Vec<String> {
        let result = scan(source);
        result
            .spans
            .iter()
            .filter(|s| s.kind == SpanKind::Statement)
            .map(|s| s.text(source).to_string())
            .collect()
    }

    #[test]
    fn splits_semicolon_terminated_statements() {
        let texts = statement_texts("const a = 1; const b = 2;");
        assert_eq!(texts, vec!["const a = 1;", "const b = 2;"]);
    }

    #[test]
    fn newline_terminates_complete_statement() {
        let texts = statement_texts("const a = 1\nconst b = 2\n");
        assert_eq!(texts, vec!["const a = 1", "const b = 2"]);
    }

    #[test]
    fn operators_keep_statement_open_across_newlines() {
        let texts = statement_texts("const a = 1 +\n  2\nconst b = 3\n");
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains('2'));
    }

    #[test]
    fn braces_inside_templates_are_ignored() {
        let texts = statement_texts("const a = `x${ { y: 1 } }z`\nconst b = 1\n");
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn regex_literal_hides_slashes() {
        let texts = statement_texts("const re = /a\\/{/; const b = 1;");
        assert_eq!(texts.len(), 2);
    }

    #[test]
    fn directive_prologue_is_tagged() {
        let result = scan("'use strict';\nconst a = 1;\n");
        assert_eq!(result.spans[0].kind, SpanKind::Directive);
        assert_eq!(result.spans[1].kind, SpanKind::Statement);
    }

    #[test]
    fn unterminated_template_reports_and_recovers() {
        let result = scan("const a = 1;\nconst b = `oops");
        assert_eq!(result.errors.len(), 1);
        let stmts: Vec<_> = result
            .spans
            .iter()
            .filter(|s| s.kind == SpanKind::Statement)
            .collect();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn blank_line_breaks_comment_attachment() {
        let source = "// dangling\n\n// attached\nconst a = 1;\n";
        let result = scan(source);
        let stmts = statements(source, &result, true);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].leading_comments, vec!["// attached"]);
    }
}
