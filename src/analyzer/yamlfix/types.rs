//! Core types for the yamlfix repair engine.
//!
//! - `Severity` - How serious a repaired or reported defect is
//! - `FixCategory` - What kind of edit a `Change` is
//! - `Evidence` - How specific the match behind a decision was
//! - `Change` - One atomic edit the engine made
//! - `ValidationError` - A defect the engine reported but did not fix
//! - `LineRecord` - One classified physical line

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Severity levels for changes and validation errors.
///
/// Ordered from most severe to least severe:
/// `Critical > Error > Warning > Info`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Usually the reason a document failed to parse
    Critical,
    /// A defect that changes meaning if left alone
    Error,
    /// Suspicious but structurally harmless
    #[default]
    Warning,
    /// Cosmetic
    Info,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::Error => 2,
            Self::Warning => 1,
            Self::Info => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Category of a recorded change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixCategory {
    Indentation,
    KeyTypo,
    MissingColon,
    ColonSpacing,
    ListSpacing,
    QuoteBalance,
    NumericCoercion,
    BooleanCoercion,
    DuplicateKey,
    StructuralMove,
}

impl FixCategory {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indentation => "indentation",
            Self::KeyTypo => "key-typo",
            Self::MissingColon => "missing-colon",
            Self::ColonSpacing => "colon-spacing",
            Self::ListSpacing => "list-spacing",
            Self::QuoteBalance => "quote-balance",
            Self::NumericCoercion => "numeric-coercion",
            Self::BooleanCoercion => "boolean-coercion",
            Self::DuplicateKey => "duplicate-key",
            Self::StructuralMove => "structural-move",
        }
    }

    /// The error code `validate` reports for a defect of this category.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Indentation => ErrorCode::IndentMismatch,
            Self::KeyTypo => ErrorCode::KeyTypo,
            Self::MissingColon => ErrorCode::MissingColon,
            Self::ColonSpacing => ErrorCode::ColonSpacing,
            Self::ListSpacing => ErrorCode::ListSpacing,
            Self::QuoteBalance => ErrorCode::UnbalancedQuote,
            Self::NumericCoercion => ErrorCode::NumericType,
            Self::BooleanCoercion => ErrorCode::BooleanType,
            Self::DuplicateKey => ErrorCode::DuplicateKey,
            Self::StructuralMove => ErrorCode::StructureConflict,
        }
    }
}

impl fmt::Display for FixCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a change was justified. The confidence scorer maps this to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Evidence {
    /// Exact match against the known-field table
    KnownField,
    /// Explicit entry in the alias map
    Alias,
    /// Known field or alias, matched ignoring case
    CaseFold,
    /// Single-edit match against a unique known field
    Fuzzy,
    /// Closed vocabulary (number words, boolean words)
    Vocabulary,
    /// Nesting implied by the previous line (e.g. a `key:` opener)
    Context,
    /// Nesting inferred from list structure or relative indentation
    Inference,
    /// Bare textual pattern, no field recognized
    Pattern,
    /// Lossless mechanical rewrite (tabs)
    Mechanical,
    /// Nothing was edited; the change records a detection
    Detection,
}

/// Engine pass that produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Syntax,
    Parse,
    Indentation,
    Semantic,
    Structural,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Parse => "parse",
            Self::Indentation => "indentation",
            Self::Semantic => "semantic",
            Self::Structural => "structural",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One atomic edit made by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Source line (1-indexed). Structural moves point at the moved key.
    pub line: usize,
    /// Text before the edit.
    pub original: String,
    /// Text after the edit.
    pub fixed: String,
    pub category: FixCategory,
    pub reason: String,
    pub severity: Severity,
    /// 0.0 until the confidence scorer runs.
    pub confidence: f64,
    pub evidence: Evidence,
    pub phase: Phase,
}

impl Change {
    /// Create a new change with confidence left for the scorer.
    pub fn new(
        line: usize,
        original: impl Into<String>,
        fixed: impl Into<String>,
        category: FixCategory,
        severity: Severity,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            line,
            original: original.into(),
            fixed: fixed.into(),
            category,
            reason: reason.into(),
            severity,
            confidence: 0.0,
            evidence: Evidence::Pattern,
            phase: Phase::Syntax,
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Whether the change rewrote text (duplicate-key records do not).
    pub fn is_edit(&self) -> bool {
        self.original != self.fixed
    }

    /// Convert into the read-only diagnostic `validate` reports.
    pub fn to_validation_error(&self) -> ValidationError {
        ValidationError::new(self.line, self.reason.clone(), self.category.error_code())
            .with_severity(self.severity)
            .with_fixable(self.category != FixCategory::DuplicateKey)
    }
}

/// Stable machine code for a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ParseError,
    UnknownField,
    TabIndent,
    MissingColon,
    ColonSpacing,
    ListSpacing,
    KeyTypo,
    UnbalancedQuote,
    IndentMismatch,
    NumericType,
    BooleanType,
    DuplicateKey,
    StructureConflict,
    SerializeError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "PARSE_ERROR",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::TabIndent => "TAB_INDENT",
            Self::MissingColon => "MISSING_COLON",
            Self::ColonSpacing => "COLON_SPACING",
            Self::ListSpacing => "LIST_SPACING",
            Self::KeyTypo => "KEY_TYPO",
            Self::UnbalancedQuote => "UNBALANCED_QUOTE",
            Self::IndentMismatch => "INDENT_MISMATCH",
            Self::NumericType => "NUMERIC_TYPE",
            Self::BooleanType => "BOOLEAN_TYPE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::StructureConflict => "STRUCTURE_CONFLICT",
            Self::SerializeError => "SERIALIZE_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A defect the engine detected but did not (or could not) fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Line number (1-indexed), 0 when the defect has no single line.
    pub line: usize,
    /// Column number (1-indexed), when known.
    pub column: Option<usize>,
    pub message: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub fixable: bool,
}

impl ValidationError {
    pub fn new(line: usize, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            line,
            column: None,
            message: message.into(),
            code,
            severity: Severity::Error,
            fixable: false,
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }
}

impl Ord for ValidationError {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
            .then_with(|| other.severity.cmp(&self.severity))
            .then_with(|| self.code.as_str().cmp(other.code.as_str()))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.fixable.cmp(&other.fixable))
    }
}

impl PartialOrd for ValidationError {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Structural class of a physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineClass {
    Blank,
    Comment,
    /// `---` or `...`
    DocumentSeparator,
    ListItem,
    KeyValue,
    /// `key: |`, `key: >-`, `- key: |`
    BlockScalarOpener,
    BlockScalarBody,
    /// Non-empty line without a key separator
    BareToken,
}

impl LineClass {
    /// Blank, comment and separator lines are exempt from structural checks.
    pub fn is_exempt(&self) -> bool {
        matches!(self, Self::Blank | Self::Comment | Self::DocumentSeparator)
    }
}

/// One classified physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    /// Line number (1-indexed).
    pub number: usize,
    pub raw: String,
    /// Leading whitespace width with tabs expanded.
    pub indent: usize,
    pub class: LineClass,
    /// Extracted key for key-value lines (and list items carrying one).
    pub key: Option<String>,
    /// Extracted value, when present and non-empty.
    pub value: Option<String>,
    /// Separator colon is not followed by a space (`key:value`).
    pub tight_colon: bool,
}

impl LineRecord {
    /// Trimmed content of the line.
    pub fn content(&self) -> &str {
        self.raw.trim()
    }

    pub fn is_list_item(&self) -> bool {
        self.class == LineClass::ListItem
            || (self.content().starts_with("- ") && self.class == LineClass::BlockScalarOpener)
    }

    /// Whether the next significant line should be nested one step deeper.
    pub fn expects_children(&self) -> bool {
        match self.class {
            LineClass::BlockScalarOpener => true,
            LineClass::KeyValue => self.key.is_some() && self.value.is_none(),
            LineClass::ListItem => self.key.is_some() && self.value.is_none(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("CRITICAL"), Some(Severity::Critical));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("bogus"), None);
    }

    #[test]
    fn test_category_serializes_kebab_case() {
        let json = serde_json::to_string(&FixCategory::MissingColon).unwrap();
        assert_eq!(json, "\"missing-colon\"");
        assert_eq!(FixCategory::NumericCoercion.as_str(), "numeric-coercion");
    }

    #[test]
    fn test_error_code_serializes_screaming() {
        let json = serde_json::to_string(&ErrorCode::ParseError).unwrap();
        assert_eq!(json, "\"PARSE_ERROR\"");
        assert_eq!(ErrorCode::StructureConflict.to_string(), "STRUCTURE_CONFLICT");
    }

    #[test]
    fn test_change_is_edit() {
        let edit = Change::new(
            1,
            "a b",
            "a: b",
            FixCategory::MissingColon,
            Severity::Critical,
            "x",
        );
        assert!(edit.is_edit());

        let record = Change::new(
            3,
            "name: a",
            "name: a",
            FixCategory::DuplicateKey,
            Severity::Error,
            "dup",
        );
        assert!(!record.is_edit());
        assert!(!record.to_validation_error().fixable);
    }

    #[test]
    fn test_exempt_line_classes() {
        assert!(LineClass::Blank.is_exempt());
        assert!(LineClass::Comment.is_exempt());
        assert!(LineClass::DocumentSeparator.is_exempt());
        assert!(!LineClass::BareToken.is_exempt());
        assert!(!LineClass::BlockScalarBody.is_exempt());
    }

    #[test]
    fn test_validation_error_ordering() {
        let mut errors = vec![
            ValidationError::new(5, "b", ErrorCode::UnknownField),
            ValidationError::new(2, "a", ErrorCode::ParseError).with_column(4),
            ValidationError::new(2, "c", ErrorCode::ParseError).with_column(1),
        ];
        errors.sort();
        assert_eq!(errors[0].column, Some(1));
        assert_eq!(errors[1].column, Some(4));
        assert_eq!(errors[2].line, 5);
    }
}
