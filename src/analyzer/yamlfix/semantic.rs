//! Phase 3: type coercion and duplicate-key detection.
//!
//! Runs only on text that passed the parse gate. Each key-value line is
//! handled on its own; trailing comments survive coercion. Duplicate keys
//! are reported, never removed.

use std::collections::{BTreeMap, HashMap};

use crate::analyzer::yamlfix::classifier::{LineClassifier, ParentStack, content_start, value_span};
use crate::analyzer::yamlfix::knowledge::{
    boolean_word, is_boolean_field, is_freeform_parent, is_numeric_field, number_word,
};
use crate::analyzer::yamlfix::normalizer::join_lines;
use crate::analyzer::yamlfix::types::{
    Change, Evidence, FixCategory, LineClass, LineRecord, Phase, Severity,
};

/// Output of the semantic pass.
#[derive(Debug, Clone, Default)]
pub struct SemanticOutcome {
    pub text: String,
    pub changes: Vec<Change>,
}

/// A value rewrite chosen by a coercion rule.
struct Coercion {
    value: String,
    category: FixCategory,
    severity: Severity,
    evidence: Evidence,
    reason: String,
}

/// Keys seen per mapping column since that mapping was opened.
#[derive(Debug, Default)]
struct DuplicateTracker {
    levels: BTreeMap<usize, HashMap<String, usize>>,
}

impl DuplicateTracker {
    /// Start a fresh mapping at `column` (a new list item).
    fn open(&mut self, column: usize) {
        self.levels.retain(|c, _| *c < column);
    }

    /// Record `key` at `column`; returns the line of an earlier sibling.
    fn see(&mut self, column: usize, key: &str, line: usize) -> Option<usize> {
        self.levels.retain(|c, _| *c <= column);
        let keys = self.levels.entry(column).or_default();
        match keys.get(key) {
            Some(first) => Some(*first),
            None => {
                keys.insert(key.to_string(), line);
                None
            }
        }
    }

    fn clear(&mut self) {
        self.levels.clear();
    }
}

/// Apply coercions and detect duplicate keys.
pub fn apply(text: &str, tab_width: usize) -> SemanticOutcome {
    let mut classifier = LineClassifier::new(tab_width);
    let mut parents = ParentStack::default();
    let mut duplicates = DuplicateTracker::default();
    let mut changes = Vec::new();
    let mut lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let record = classifier.classify(number, raw);
        let mut line = raw.to_string();

        match record.class {
            LineClass::DocumentSeparator => {
                parents.clear();
                duplicates.clear();
            }
            LineClass::KeyValue | LineClass::ListItem | LineClass::BlockScalarOpener => {
                parents.enter(record.indent);
                let freeform = parents.parent().is_some_and(is_freeform_parent);

                if let Some(change) = detect_duplicate(&record, &mut duplicates) {
                    changes.push(change);
                }

                if !freeform
                    && record.class != LineClass::BlockScalarOpener
                    && let Some(coercion) = coerce(&record)
                    && let Some((start, end)) = value_span(raw)
                {
                    let fixed = format!("{}{}{}", &raw[..start], coercion.value, &raw[end..]);
                    changes.push(
                        Change::new(
                            number,
                            raw,
                            fixed.clone(),
                            coercion.category,
                            coercion.severity,
                            coercion.reason,
                        )
                        .with_evidence(coercion.evidence)
                        .with_phase(Phase::Semantic),
                    );
                    line = fixed;
                }

                parents.push(&record);
            }
            _ => {}
        }

        lines.push(line);
    }

    log::debug!("semantic pass: {} changes", changes.len());
    SemanticOutcome {
        text: join_lines(&lines, text),
        changes,
    }
}

/// Detection-only duplicate-key pass, for `validate`.
pub fn detect_duplicates(text: &str, tab_width: usize) -> Vec<Change> {
    apply(text, tab_width)
        .changes
        .into_iter()
        .filter(|c| c.category == FixCategory::DuplicateKey)
        .collect()
}

fn detect_duplicate(record: &LineRecord, tracker: &mut DuplicateTracker) -> Option<Change> {
    let column = if record.is_list_item() {
        let column = record.indent + content_start(record.raw.trim_start());
        tracker.open(column);
        column
    } else {
        record.indent
    };

    let key = record.key.as_deref()?;
    let first = tracker.see(column, key, record.number)?;
    Some(
        Change::new(
            record.number,
            record.raw.clone(),
            record.raw.clone(),
            FixCategory::DuplicateKey,
            Severity::Error,
            format!("Duplicate key `{}` (first defined on line {})", key, first),
        )
        .with_evidence(Evidence::Detection)
        .with_phase(Phase::Semantic),
    )
}

fn coerce(record: &LineRecord) -> Option<Coercion> {
    let key = record.key.as_deref()?;
    let value = record.value.as_deref()?;
    if is_numeric_field(key) {
        coerce_number(key, value)
    } else if is_boolean_field(key) {
        coerce_boolean(key, value)
    } else {
        None
    }
}

fn unquote(value: &str) -> Option<&str> {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    quoted.then(|| &value[1..value.len() - 1])
}

fn is_numeral(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn coerce_number(key: &str, value: &str) -> Option<Coercion> {
    let inner = unquote(value);
    if let Some(inner) = inner
        && is_numeral(inner)
    {
        return Some(Coercion {
            value: inner.to_string(),
            category: FixCategory::NumericCoercion,
            severity: Severity::Info,
            evidence: Evidence::KnownField,
            reason: format!("Unquoted numeric value of `{}`", key),
        });
    }

    let word = inner.unwrap_or(value);
    let digit = number_word(word)?;
    Some(Coercion {
        value: digit.to_string(),
        category: FixCategory::NumericCoercion,
        severity: Severity::Warning,
        evidence: Evidence::Vocabulary,
        reason: format!("Converted `{}` to {} for `{}`", word, digit, key),
    })
}

fn coerce_boolean(key: &str, value: &str) -> Option<Coercion> {
    if value == "true" || value == "false" {
        return None;
    }
    let inner = unquote(value);
    let word = inner.unwrap_or(value);
    let flag = boolean_word(word)?;

    // A quoted canonical literal only needs its quotes removed.
    let canonical = word == "true" || word == "false";
    Some(Coercion {
        value: flag.to_string(),
        category: FixCategory::BooleanCoercion,
        severity: if canonical { Severity::Info } else { Severity::Warning },
        evidence: if canonical {
            Evidence::KnownField
        } else {
            Evidence::Vocabulary
        },
        reason: format!("Converted `{}` to {} for `{}`", value, flag, key),
    })
}
