//! Diagnostics
//!
//! Every failure in the pipeline is reported as a returned `Diagnostic`;
//! no stage aborts a file. The scanner's unterminated-token conditions are
//! the only internal error type, and they too are converted to diagnostics
//! at the extraction boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse_util::{source_context, Location};

/// Machine-readable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    ParseError,
    ExtractionError,
    ProcessingError,
    UnresolvedType,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "PARSE_ERROR",
            DiagnosticCode::ExtractionError => "EXTRACTION_ERROR",
            DiagnosticCode::ProcessingError => "PROCESSING_ERROR",
            DiagnosticCode::UnresolvedType => "UNRESOLVED_TYPE",
        }
    }
}

/// One reported problem. `UnresolvedType` diagnostics are informational;
/// the other codes mark recoverable failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, file: impl Into<String>) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            file: file.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_informational(&self) -> bool {
        self.code == DiagnosticCode::UnresolvedType
    }

    /// Render the message together with a short source excerpt around the
    /// diagnostic location.
    pub fn contextual_message(&self, source: &str) -> String {
        match self.location {
            Some(loc) => {
                let (before, after) = source_context(source, loc.offset, 40);
                format!(
                    "{} [{}]: {} (\"{}[->]{}\")",
                    self.code.as_str(),
                    loc,
                    self.message,
                    before,
                    after
                )
            }
            None => format!("{}: {}", self.code.as_str(), self.message),
        }
    }
}

/// The token class a scanner error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnterminatedKind {
    String,
    Template,
    Comment,
    Regex,
}

impl std::fmt::Display for UnterminatedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UnterminatedKind::String => "string literal",
            UnterminatedKind::Template => "template literal",
            UnterminatedKind::Comment => "block comment",
            UnterminatedKind::Regex => "regular expression",
        };
        f.write_str(name)
    }
}

/// Fatal scanner condition: a token ran past its line or the end of input.
/// Recoverable at the extraction boundary: the statement under construction
/// is dropped and everything scanned before it survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unterminated {kind} starting at offset {offset}")]
pub struct ScanError {
    pub kind: UnterminatedKind,
    pub offset: usize,
}

impl ScanError {
    pub fn new(kind: UnterminatedKind, offset: usize) -> Self {
        ScanError { kind, offset }
    }

    pub fn string(offset: usize) -> Self {
        ScanError::new(UnterminatedKind::String, offset)
    }

    pub fn template(offset: usize) -> Self {
        ScanError::new(UnterminatedKind::Template, offset)
    }

    pub fn comment(offset: usize) -> Self {
        ScanError::new(UnterminatedKind::Comment, offset)
    }

    pub fn regex(offset: usize) -> Self {
        ScanError::new(UnterminatedKind::Regex, offset)
    }
}
