//! Parse Utilities
//!
//! Source file handles, byte offsets and line/column resolution for
//! diagnostics.

use serde::{Deserialize, Serialize};

use crate::chars;

/// A source file handed to the pipeline. `url` is only ever used in
/// diagnostics; it is never resolved or opened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

/// A resolved position inside a source file. Lines and columns are
/// one-based; `offset` is the zero-based byte offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Location { line, column, offset }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Resolve a byte offset into a line/column pair with a single forward scan
/// of the source. Offsets past the end clamp to the final position.
pub fn location_at(source: &str, offset: usize) -> Location {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut column = 1;
    for b in source.as_bytes()[..offset].iter() {
        if *b == chars::NEWLINE as u8 {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Location::new(line, column, offset)
}

/// Return the source text around `offset`, up to `max_chars` on each side,
/// truncated at line boundaries.
pub fn source_context(source: &str, offset: usize, max_chars: usize) -> (String, String) {
    let offset = offset.min(source.len());
    let before_start = source[..offset]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0)
        .max(offset.saturating_sub(max_chars));
    let after_end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len())
        .min(offset + max_chars);
    // Clamp to char boundaries so slicing multi-byte text stays valid.
    let before_start = floor_char_boundary(source, before_start);
    let after_end = floor_char_boundary(source, after_end);
    (
        source[before_start..offset].to_string(),
        source[offset..after_end].to_string(),
    )
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_offsets_to_one_based_lines() {
        let src = "ab\ncd\nef";
        assert_eq!(location_at(src, 0), Location::new(1, 1, 0));
        assert_eq!(location_at(src, 3), Location::new(2, 1, 3));
        assert_eq!(location_at(src, 7), Location::new(3, 2, 7));
    }

    #[test]
    fn clamps_out_of_range_offsets() {
        let loc = location_at("ab", 10);
        assert_eq!(loc.offset, 2);
    }

    #[test]
    fn context_stops_at_line_boundaries() {
        let (before, after) = source_context("aaa\nbbb ccc\nddd", 8, 100);
        assert_eq!(before, "bbb ");
        assert_eq!(after, "ccc");
    }
}
