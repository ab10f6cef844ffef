/*
 * Character Codes
 *
 * Character constants and predicates shared by the scanner and the
 * declaration header parsers.
 */

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n'; // Line feed
pub const NEWLINE: char = '\n'; // Alias for LF
pub const CR: char = '\r'; // Carriage return
pub const SPACE: char = ' ';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const DOLLAR: char = '$';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const STAR: char = '*';
pub const PLUS: char = '+';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SLASH: char = '/';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const AT: char = '@';

// Brackets
pub const LBRACKET: char = '[';
pub const BACKSLASH: char = '\\';
pub const RBRACKET: char = ']';
pub const UNDERSCORE: char = '_';
pub const BT: char = '`';

// Braces
pub const LBRACE: char = '{';
pub const BAR: char = '|';
pub const RBRACE: char = '}';

/// Check if character is whitespace (horizontal or vertical)
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == NEWLINE || ch == CR || ch == '\x0B' || ch == '\x0C'
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if character is newline
pub fn is_new_line(ch: char) -> bool {
    ch == NEWLINE || ch == CR
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    ch == DOLLAR || ch == UNDERSCORE || ch.is_alphabetic()
}

/// Check if character can continue an identifier
pub fn is_identifier_part(ch: char) -> bool {
    ch == DOLLAR || ch == UNDERSCORE || ch.is_alphanumeric()
}

/// Check if character is a string delimiter
pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ || ch == BT
}

/// Check if byte is ASCII whitespace (scanner fast path)
pub fn is_whitespace_byte(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == 0x0B || b == 0x0C
}

/// Check if byte can appear inside an identifier (multi-byte UTF-8 lead and
/// continuation bytes are treated as identifier text)
pub fn is_identifier_byte(b: u8) -> bool {
    b == b'$' || b == b'_' || b.is_ascii_alphanumeric() || b >= 0x80
}
