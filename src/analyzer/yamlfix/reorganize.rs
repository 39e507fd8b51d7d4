//! Phase 3B: structural reorganization (aggressive mode only).
//!
//! Works on the parsed tree of each document, moving misplaced fields to
//! where the kind's nesting rules say they belong. Documents that need no
//! move are left byte-for-byte as they were; moved documents are
//! re-serialized, which drops their comments and may reorder keys.

use serde_yaml::{Mapping, Value};

use crate::analyzer::yamlfix::classifier::{content_start, split_key_value};
use crate::analyzer::yamlfix::knowledge::{
    METADATA_FIELDS, NestingRules, POD_SPEC_FIELDS, PodFieldTarget, ROOT_KEY_ORDER, nesting_rules,
};
use crate::analyzer::yamlfix::normalizer::join_lines;
use crate::analyzer::yamlfix::{parse_gate, semantic};
use crate::analyzer::yamlfix::types::{
    Change, ErrorCode, Evidence, FixCategory, Phase, Severity, ValidationError,
};

/// Output of the structural pass.
#[derive(Debug, Clone, Default)]
pub struct StructuralOutcome {
    /// Rewritten text, `None` when no document moved.
    pub text: Option<String>,
    pub changes: Vec<Change>,
    pub errors: Vec<ValidationError>,
}

/// A run of lines between document separators.
enum Piece<'a> {
    Separator(&'a str),
    Body { first_line: usize, lines: Vec<&'a str> },
}

/// Split `text` into documents, keeping separator lines.
fn pieces(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for (idx, line) in text.lines().enumerate() {
        if line == "---" || line.starts_with("--- ") || line == "..." {
            if let Some((first_line, lines)) = current.take() {
                pieces.push(Piece::Body { first_line, lines });
            }
            pieces.push(Piece::Separator(line));
        } else {
            current.get_or_insert_with(|| (idx + 1, Vec::new())).1.push(line);
        }
    }
    if let Some((first_line, lines)) = current {
        pieces.push(Piece::Body { first_line, lines });
    }
    pieces
}

/// Move misplaced fields in every recognized document of `text`.
pub fn reorganize(text: &str) -> StructuralOutcome {
    let mut outcome = StructuralOutcome::default();
    let mut output: Vec<String> = Vec::new();
    let mut moved = false;

    for piece in pieces(text) {
        match piece {
            Piece::Separator(line) => output.push(line.to_string()),
            Piece::Body { first_line, lines } => {
                let source = lines.join("\n");
                match reorganize_document(&source, first_line, &mut outcome) {
                    Some(rewritten) => {
                        moved = true;
                        output.extend(rewritten.lines().map(str::to_string));
                    }
                    None => output.extend(lines.iter().map(|l| l.to_string())),
                }
            }
        }
    }

    log::debug!(
        "structural pass: {} moves, {} conflicts",
        outcome.changes.len(),
        outcome.errors.len()
    );
    if moved {
        outcome.text = Some(join_lines(&output, text));
    }
    outcome
}

/// Tabs are expanded before this pass runs.
const TAB_WIDTH: usize = 2;

/// Reorganize one document; returns its new text when anything moved.
fn reorganize_document(
    source: &str,
    first_line: usize,
    outcome: &mut StructuralOutcome,
) -> Option<String> {
    let mut documents = parse_gate::parse_documents(source).ok()?;
    if documents.len() != 1 {
        return None;
    }
    let Value::Mapping(mut doc) = documents.remove(0) else {
        return None;
    };
    let kind = doc.get("kind").and_then(Value::as_str)?.to_string();
    let rules = nesting_rules(&kind)?;

    // The parsed tree keeps only the last of repeated keys, so re-serializing
    // it would drop the others.
    let duplicates = semantic::detect_duplicates(source, TAB_WIDTH);
    if !duplicates.is_empty() {
        for duplicate in duplicates {
            outcome.errors.push(
                ValidationError::new(
                    duplicate.line + first_line - 1,
                    format!(
                        "Cannot reorganize `{}`: duplicate key `{}` would be lost",
                        kind,
                        duplicate_key(&duplicate.original)
                    ),
                    ErrorCode::StructureConflict,
                )
                .with_severity(Severity::Warning),
            );
        }
        return None;
    }

    let mut mover = Mover {
        source,
        first_line,
        changes: Vec::new(),
        errors: Vec::new(),
    };
    mover.apply_rules(&mut doc, rules);

    let Mover { changes, errors, .. } = mover;
    outcome.errors.extend(errors);
    if changes.is_empty() {
        return None;
    }

    reorder_root(&mut doc);
    match serde_yaml::to_string(&Value::Mapping(doc)) {
        Ok(text) => {
            outcome.changes.extend(changes);
            Some(text)
        }
        Err(err) => {
            outcome.errors.push(
                ValidationError::new(
                    first_line,
                    format!("Failed to serialize `{}`: {}", kind, err),
                    ErrorCode::SerializeError,
                )
                .with_severity(Severity::Error),
            );
            None
        }
    }
}

/// Applies moves to one document and records what happened.
struct Mover<'a> {
    source: &'a str,
    first_line: usize,
    changes: Vec<Change>,
    errors: Vec<ValidationError>,
}

impl Mover<'_> {
    fn apply_rules(&mut self, doc: &mut Mapping, rules: &NestingRules) {
        for field in METADATA_FIELDS {
            self.relocate(doc, &[], field, &["metadata"]);
        }
        for field in rules.spec_fields {
            self.relocate(doc, &[], field, &["spec"]);
        }

        match rules.pod_fields {
            PodFieldTarget::None => {}
            PodFieldTarget::Spec => {
                for field in POD_SPEC_FIELDS {
                    self.relocate(doc, &[], field, &["spec"]);
                }
            }
            PodFieldTarget::Template => {
                let target = ["spec", "template", "spec"];
                for field in POD_SPEC_FIELDS {
                    self.relocate(doc, &[], field, &target);
                    self.relocate(doc, &["spec"], field, &target);
                }
                if lookup(doc, &["spec", "template"]).is_some() {
                    self.ensure(doc, &["spec", "template", "metadata"]);
                    self.ensure(doc, &["spec", "template", "spec"]);
                }
            }
        }
    }

    /// 1-based line of `path` in the whole input.
    fn line_of(&self, path: &[&str]) -> usize {
        find_line_for_key(self.source, path)
            .or_else(|| find_line_for_key(self.source, &["kind"]))
            .unwrap_or(1)
            + self.first_line
            - 1
    }

    /// Move `from.key` to `to.key` unless the destination is taken.
    fn relocate(&mut self, doc: &mut Mapping, from: &[&str], key: &str, to: &[&str]) {
        let present = match from {
            [] => doc.contains_key(key),
            _ => matches!(lookup(doc, from), Some(Value::Mapping(m)) if m.contains_key(key)),
        };
        if !present {
            return;
        }

        let source_path = dotted(from, key);
        let target_path = dotted(to, key);
        let mut key_path = from.to_vec();
        key_path.push(key);
        let line = self.line_of(&key_path);

        if let Err(reason) = destination_free(doc, to, key) {
            self.errors.push(
                ValidationError::new(
                    line,
                    format!("Cannot move `{}` to `{}`: {}", source_path, target_path, reason),
                    ErrorCode::StructureConflict,
                )
                .with_severity(Severity::Warning),
            );
            return;
        }

        let Some(value) = mapping_at_mut(doc, from).and_then(|m| m.remove(key)) else {
            return;
        };
        match ensure_mapping(doc, to) {
            Some(dest) => {
                dest.insert(Value::String(key.to_string()), value);
            }
            None => {
                if let Some(origin) = mapping_at_mut(doc, from) {
                    origin.insert(Value::String(key.to_string()), value);
                }
                return;
            }
        }

        log::trace!("moved {} -> {}", source_path, target_path);
        self.changes.push(
            Change::new(
                line,
                source_path.clone(),
                target_path.clone(),
                FixCategory::StructuralMove,
                Severity::Warning,
                format!("Moved `{}` to `{}`", source_path, target_path),
            )
            .with_evidence(Evidence::Context)
            .with_phase(Phase::Structural),
        );
    }

    /// Create an empty mapping at `path` when missing.
    fn ensure(&mut self, doc: &mut Mapping, path: &[&str]) {
        if matches!(lookup(doc, path), Some(Value::Mapping(_))) {
            return;
        }
        let (parent, key) = match path.split_last() {
            Some((key, parent)) => (parent, *key),
            None => return,
        };
        if let Err(reason) = destination_free(doc, parent, key) {
            let line = self.line_of(parent);
            self.errors.push(
                ValidationError::new(
                    line,
                    format!("Cannot create `{}`: {}", path.join("."), reason),
                    ErrorCode::StructureConflict,
                )
                .with_severity(Severity::Warning),
            );
            return;
        }
        if ensure_mapping(doc, path).is_none() {
            return;
        }

        let line = self.line_of(parent);
        self.changes.push(
            Change::new(
                line,
                String::new(),
                path.join("."),
                FixCategory::StructuralMove,
                Severity::Warning,
                format!("Created missing `{}`", path.join(".")),
            )
            .with_evidence(Evidence::Context)
            .with_phase(Phase::Structural),
        );
    }
}

fn duplicate_key(line: &str) -> &str {
    let content = &line[content_start(line)..];
    split_key_value(content).map_or(content.trim(), |split| split.key)
}

fn dotted(path: &[&str], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path.join("."), key)
    }
}

/// Value at `path`, if every step is a mapping.
fn lookup<'a>(doc: &'a Mapping, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = doc.get(*first)?;
    match (rest.is_empty(), value) {
        (true, value) => Some(value),
        (false, Value::Mapping(inner)) => lookup(inner, rest),
        (false, _) => None,
    }
}

fn mapping_at_mut<'a>(doc: &'a mut Mapping, path: &[&str]) -> Option<&'a mut Mapping> {
    let Some((first, rest)) = path.split_first() else {
        return Some(doc);
    };
    match doc.get_mut(*first)? {
        Value::Mapping(inner) => mapping_at_mut(inner, rest),
        _ => None,
    }
}

/// Walk `path`, creating missing or null steps as empty mappings.
fn ensure_mapping<'a>(doc: &'a mut Mapping, path: &[&str]) -> Option<&'a mut Mapping> {
    let Some((first, rest)) = path.split_first() else {
        return Some(doc);
    };
    if !doc.contains_key(*first) {
        doc.insert(Value::String(first.to_string()), Value::Mapping(Mapping::new()));
    }
    let slot = doc.get_mut(*first)?;
    if slot.is_null() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(inner) => ensure_mapping(inner, rest),
        _ => None,
    }
}

/// Ok when `path.key` can receive a value without overwriting anything.
fn destination_free(doc: &Mapping, path: &[&str], key: &str) -> Result<(), String> {
    let mut current = doc;
    for (depth, step) in path.iter().enumerate() {
        match current.get(*step) {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Mapping(inner)) => current = inner,
            Some(_) => return Err(format!("`{}` is not a mapping", path[..=depth].join("."))),
        }
    }
    if current.contains_key(key) {
        Err(format!("`{}` already exists", dotted(path, key)))
    } else {
        Ok(())
    }
}

/// Put envelope keys first in canonical order; keep the rest in place.
fn reorder_root(doc: &mut Mapping) {
    let mut rest = std::mem::take(doc);
    for key in ROOT_KEY_ORDER {
        if let Some(value) = rest.remove(*key) {
            doc.insert(Value::String(key.to_string()), value);
        }
    }
    for (key, value) in rest {
        doc.insert(key, value);
    }
}

/// 1-based line of the key at `path` within `source`.
fn find_line_for_key(source: &str, path: &[&str]) -> Option<usize> {
    if path.is_empty() {
        return Some(1);
    }

    let mut current_indent = 0;
    let mut path_idx = 0;

    for (line_num, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indent = line.len() - line.trim_start().len();
        let target_key = path[path_idx];
        let matches = trimmed.starts_with(&format!("{}:", target_key)) || trimmed == target_key;
        let nested = if path_idx == 0 {
            indent == 0
        } else {
            indent > current_indent
        };

        if matches && nested {
            path_idx += 1;
            current_indent = indent;
            if path_idx == path.len() {
                return Some(line_num + 1);
            }
        }
    }

    None
}
