/**
 * Declaration Data Model
 *
 * The single universal record produced by the extractor and consumed by
 * the processor. Members recurse: class bodies, interface bodies, enum
 * cases and namespace bodies are themselves declaration lists, forming a
 * finite tree.
 */
use bitflags::bitflags;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// Discriminator for every extracted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Function,
    Variable,
    Interface,
    Type,
    Class,
    Enum,
    Import,
    Export,
    Module,
    Namespace,
}

/// Binding keyword of a variable statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Const,
    Let,
    Var,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Const => "const",
            VarKind::Let => "let",
            VarKind::Var => "var",
        }
    }

    /// `const` narrows literal initializers; `let`/`var` widen.
    pub fn narrows(&self) -> bool {
        matches!(self, VarKind::Const)
    }
}

/// Member visibility, also used for constructor parameter-properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        }
    }
}

/// Accessor flavor for `get`/`set` class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Getter,
    Setter,
}

bitflags! {
    /// Modifier keywords attached to a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const DECLARE = 1 << 0;
        const ASYNC = 1 << 1;
        const ABSTRACT = 1 << 2;
        const STATIC = 1 << 3;
        const PUBLIC = 1 << 4;
        const PRIVATE = 1 << 5;
        const PROTECTED = 1 << 6;
        const READONLY = 1 << 7;
        const OVERRIDE = 1 << 8;
    }
}

// Keyword order used both for serialization and for emitted member
// prefixes.
const MODIFIER_KEYWORDS: &[(Modifiers, &str)] = &[
    (Modifiers::DECLARE, "declare"),
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::STATIC, "static"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::OVERRIDE, "override"),
    (Modifiers::READONLY, "readonly"),
    (Modifiers::ASYNC, "async"),
];

impl Modifiers {
    pub fn from_keyword(word: &str) -> Option<Modifiers> {
        MODIFIER_KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == word)
            .map(|(flag, _)| *flag)
    }

    /// Keywords in canonical emission order.
    pub fn keywords(&self) -> Vec<&'static str> {
        MODIFIER_KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, kw)| *kw)
            .collect()
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let keywords = self.keywords();
        let mut seq = serializer.serialize_seq(Some(keywords.len()))?;
        for kw in keywords {
            seq.serialize_element(kw)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeywordsVisitor;

        impl<'de> Visitor<'de> for KeywordsVisitor {
            type Value = Modifiers;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a list of modifier keywords")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Modifiers, A::Error> {
                let mut flags = Modifiers::empty();
                while let Some(word) = seq.next_element::<String>()? {
                    match Modifiers::from_keyword(&word) {
                        Some(flag) => flags |= flag,
                        None => return Err(de::Error::custom(format!("unknown modifier `{}`", word))),
                    }
                }
                Ok(flags)
            }
        }

        deserializer.deserialize_seq(KeywordsVisitor)
    }
}

/// One parameter of a function, method or constructor. `visibility` and
/// `readonly` only appear on constructor parameter-properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub type_annotation: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub readonly: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            type_annotation: None,
            optional: false,
            rest: false,
            default_value: None,
            visibility: None,
            readonly: false,
        }
    }

    /// Parameter-properties implicitly declare a class property.
    pub fn is_property(&self) -> bool {
        self.visibility.is_some() || self.readonly
    }
}

/// One imported or re-exported binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub is_type: bool,
}

impl ImportSpecifier {
    pub fn new(name: impl Into<String>) -> Self {
        ImportSpecifier {
            name: name.into(),
            alias: None,
            is_type: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name the binding is visible under locally.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// The universal declaration record. Field population depends on `kind`;
/// unused fields keep their defaults.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// Raw captured source of the statement, byte-equal to
    /// `source[start..end]`.
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub is_exported: bool,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leading_comments: Vec<String>,
    pub modifiers: Modifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<VarKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Declaration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Module specifier exactly as written, including quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specifiers: Vec<ImportSpecifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_import: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_import: Option<String>,
    pub is_type_only: bool,
    pub is_side_effect: bool,
    /// `import X = require('m')` form; emitted verbatim.
    pub is_import_equals: bool,
    pub is_async: bool,
    pub is_generator: bool,
    /// `name?: T` optional member marker.
    pub is_optional: bool,
    /// For a grouped overload set: every signature text in source order,
    /// the last being the implementation signature with its body elided.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overloads: Vec<String>,
    /// Whether each overload entry originally carried a body.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overload_bodies: Vec<bool>,
    pub has_body: bool,
    /// Offset into `text` where the body block begins, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessor: Option<AccessorKind>,
    /// The type annotation was synthesized rather than written.
    pub type_inferred: bool,
    /// Best-effort note when the header failed to balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Declaration {
            kind,
            name: name.into(),
            text: String::new(),
            start: 0,
            end: 0,
            is_exported: false,
            is_default: false,
            leading_comments: Vec::new(),
            modifiers: Modifiers::empty(),
            generics: None,
            type_annotation: None,
            binding: None,
            extends: None,
            implements: Vec::new(),
            members: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            source: None,
            source_text: None,
            specifiers: Vec::new(),
            default_import: None,
            namespace_import: None,
            is_type_only: false,
            is_side_effect: false,
            is_import_equals: false,
            is_async: false,
            is_generator: false,
            is_optional: false,
            overloads: Vec::new(),
            overload_bodies: Vec::new(),
            has_body: false,
            body_start: None,
            accessor: None,
            type_inferred: false,
            error: None,
        }
    }

    pub fn is_import(&self) -> bool {
        self.kind == DeclarationKind::Import
    }

    pub fn is_function(&self) -> bool {
        self.kind == DeclarationKind::Function
    }

    /// Private members never survive processing. ECMAScript `#` names are
    /// private by construction.
    pub fn is_private(&self) -> bool {
        self.modifiers.contains(Modifiers::PRIVATE) || self.name.starts_with('#')
    }

    pub fn is_ambient(&self) -> bool {
        self.modifiers.contains(Modifiers::DECLARE)
    }

    /// Signature text with any body elided, terminated by `;`.
    pub fn signature_text(&self) -> String {
        match self.body_start {
            Some(at) if at <= self.text.len() => {
                format!("{};", self.text[..at].trim_end())
            }
            _ => {
                let trimmed = self.text.trim_end();
                if trimmed.ends_with(';') {
                    trimmed.to_string()
                } else {
                    format!("{};", trimmed)
                }
            }
        }
    }
}

/// Render a declaration list as a JSON tree for tooling consumers.
pub fn declarations_to_json(declarations: &[Declaration]) -> serde_json::Value {
    serde_json::to_value(declarations).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_round_trip_as_keyword_lists() {
        let flags = Modifiers::DECLARE | Modifiers::STATIC | Modifiers::READONLY;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["declare","static","readonly"]"#);
        let back: Modifiers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn parameter_properties_are_detected() {
        let mut p = Parameter::new("id");
        assert!(!p.is_property());
        p.readonly = true;
        assert!(p.is_property());
    }

    #[test]
    fn signature_text_elides_bodies() {
        let mut decl = Declaration::new(DeclarationKind::Function, "f");
        decl.text = "function f(): void { return }".to_string();
        decl.body_start = Some("function f(): void ".len());
        decl.has_body = true;
        assert_eq!(decl.signature_text(), "function f(): void;");
    }
}
