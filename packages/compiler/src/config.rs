//! Generation options
//!
//! The recognized option set for one pipeline invocation. Unknown fields in
//! serialized form are ignored.

use serde::{Deserialize, Serialize};

/// How a host lays out emitted files. The core does not write files; the
/// value participates only so option hashes agree between host and core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStructure {
    Mirror,
    Flat,
}

/// Options recognized by the core pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Keep leading comment blocks attached to declarations.
    pub retain_comments: bool,
    /// Ordered priority patterns for import grouping. A module specifier
    /// belongs to the first pattern it equals or starts with; unmatched
    /// specifiers fall into a trailing bucket.
    pub import_order: Vec<String>,
    pub output_structure: OutputStructure,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            retain_comments: true,
            import_order: vec!["bun".to_string()],
            output_structure: OutputStructure::Mirror,
        }
    }
}

impl GenerateOptions {
    pub fn with_import_order<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.import_order = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn without_comments(mut self) -> Self {
        self.retain_comments = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_prioritize_bun_imports() {
        let options = GenerateOptions::default();
        assert!(options.retain_comments);
        assert_eq!(options.import_order, vec!["bun".to_string()]);
        assert_eq!(options.output_structure, OutputStructure::Mirror);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let options: GenerateOptions =
            serde_json::from_str(r#"{"retain_comments": false, "emit_source_maps": true}"#)
                .unwrap();
        assert!(!options.retain_comments);
        assert_eq!(options.import_order, vec!["bun".to_string()]);
    }
}
