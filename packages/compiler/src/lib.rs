#![deny(clippy::all)]

/**
 * Declaration Compiler
 *
 * Generates TypeScript declaration text from source without the TypeScript
 * compiler's emit step. The pipeline is a pure function over one source
 * string: scan top-level spans, extract Declarations, process them into
 * `.d.ts` text. No I/O, no shared state; concurrent invocations are
 * independent.
 */
// Core modules (root level)
pub mod chars;
pub mod config;
pub mod error;
pub mod parse_util;

// Pipeline stages
pub mod extractor;
pub mod processor;
pub mod scanner;

// Re-exports
pub use config::{GenerateOptions, OutputStructure};
pub use error::{Diagnostic, DiagnosticCode};
pub use extractor::declaration::{
    declarations_to_json, AccessorKind, Declaration, DeclarationKind, ImportSpecifier, Modifiers,
    Parameter, VarKind, Visibility,
};
pub use extractor::{extract_declarations, ExtractResult};
pub use processor::{process, ProcessResult};

/// Result of one full pipeline invocation.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate declaration text for one source string. `file_path` only
/// appears in diagnostics; it is never opened. Errors are returned, never
/// thrown, and emission proceeds past every recoverable failure.
pub fn generate_from_source(
    source: &str,
    file_path: &str,
    options: &GenerateOptions,
) -> GenerateResult {
    let extracted = extract_declarations(source, file_path, options.retain_comments);
    let mut diagnostics = extracted.diagnostics;
    let processed = processor::process(extracted.declarations, options, file_path);
    diagnostics.extend(processed.diagnostics);
    GenerateResult {
        output: processed.output,
        diagnostics,
    }
}

/// Structured-form entry point for consumers that want Declarations rather
/// than text.
pub fn extract(source: &str, file_path: &str, retain_comments: bool) -> ExtractResult {
    extract_declarations(source, file_path, retain_comments)
}
