//! Fix orchestration and read-only validation.
//!
//! `fix` runs the phases in order, looping syntax, indentation and semantic
//! passes until an iteration makes no edit or the iteration cap is reached.
//! A parse failure stops the loop but keeps what the line-local passes
//! managed. `validate` runs the detecting halves only and never rewrites.

use std::time::{Duration, Instant};

use crate::analyzer::yamlfix::config::{FixOptions, ValidateOptions};
use crate::analyzer::yamlfix::types::{
    Change, ErrorCode, Evidence, FixCategory, Severity, ValidationError,
};
use crate::analyzer::yamlfix::{confidence, indent, normalizer, parse_gate, reorganize, semantic};

/// Wall-clock time spent in each pass, summed over iterations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassTimings {
    pub syntax: Duration,
    pub indentation: Duration,
    pub semantic: Duration,
    pub structural: Duration,
    pub total: Duration,
}

/// Result of fixing one document stream.
#[derive(Debug, Clone)]
pub struct FixResult {
    /// The file path (or `<inline>`) the content came from.
    pub file_path: String,
    /// Input text, unchanged.
    pub original: String,
    /// Repaired text.
    pub fixed: String,
    /// Every change made, in the order the passes made them.
    pub changes: Vec<Change>,
    /// Defects left unfixed.
    pub errors: Vec<ValidationError>,
    /// Mean change confidence, 1.0 when nothing changed.
    pub confidence: f64,
    /// The repaired text parses and no error-level defect remains, whether
    /// left unfixed or only detected (duplicate keys).
    pub is_valid: bool,
    /// Review threshold the changes are partitioned by.
    pub threshold: f64,
    /// Repair passes run.
    pub iterations: usize,
    pub timings: PassTimings,
}

impl FixResult {
    fn new(file_path: impl Into<String>, original: &str, threshold: f64) -> Self {
        Self {
            file_path: file_path.into(),
            original: original.to_string(),
            fixed: original.to_string(),
            changes: Vec::new(),
            errors: Vec::new(),
            confidence: 1.0,
            is_valid: false,
            threshold,
            iterations: 0,
            timings: PassTimings::default(),
        }
    }

    /// Number of changes that rewrote text.
    pub fn fixed_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_edit()).count()
    }

    /// Whether the output differs from the input.
    pub fn is_modified(&self) -> bool {
        self.fixed != self.original
    }

    /// Changes at or above the threshold.
    pub fn accepted(&self) -> Vec<&Change> {
        self.changes.iter().filter(|c| c.confidence >= self.threshold).collect()
    }

    /// Changes below the threshold, surfaced for human review.
    pub fn needs_review(&self) -> Vec<&Change> {
        self.changes.iter().filter(|c| c.confidence < self.threshold).collect()
    }

}

/// Result of validating one document stream.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub file_path: String,
    /// No error-level defect was found.
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.severity >= Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors.iter().filter(|e| e.severity < Severity::Error).count()
    }
}

/// Fix a document stream.
pub fn fix(content: &str, options: &FixOptions) -> FixResult {
    fix_with_path(content, "<inline>", options)
}

/// Fix a document stream with a path for messages.
pub fn fix_with_path(content: &str, path: &str, options: &FixOptions) -> FixResult {
    let start = Instant::now();
    let options = options.normalized();
    let step = options.indent_step;
    let mut result = FixResult::new(path, content, options.confidence_threshold);
    let mut text = content.to_string();
    let mut parsed = false;

    log::info!(
        "Fixing {} ({} bytes, aggressive: {})",
        path,
        content.len(),
        options.aggressive
    );

    for iteration in 1..=options.max_iterations {
        result.iterations = iteration;

        let pass = Instant::now();
        let syntax = normalizer::normalize(&text, step);
        result.timings.syntax += pass.elapsed();

        let pass = Instant::now();
        let indented = indent::reconstruct(&syntax.text, step);
        result.timings.indentation += pass.elapsed();

        let gate = parse_gate::check(&indented.text);
        let (candidate, indent_changes, gate) = if gate.passed() {
            (indented.text, indented.changes, gate)
        } else {
            let fallback = parse_gate::check(&syntax.text);
            if fallback.passed() {
                log::warn!(
                    "{}: re-indentation made the document unparseable; keeping line-level fixes",
                    path
                );
                (syntax.text.clone(), Vec::new(), fallback)
            } else {
                (indented.text, indented.changes, gate)
            }
        };

        let mut edited = syntax.changes.iter().any(Change::is_edit) || !indent_changes.is_empty();
        result.changes.extend(syntax.changes);
        result.changes.extend(indent_changes);
        result.errors = syntax.errors;
        text = candidate;

        if !gate.passed() {
            log::debug!("{}: parse gate failed on iteration {}", path, iteration);
            result.errors.extend(gate.errors);
            parsed = false;
            break;
        }
        parsed = true;

        let pass = Instant::now();
        let semantic = semantic::apply(&text, step);
        result.timings.semantic += pass.elapsed();

        for change in semantic.changes {
            if change.is_edit() {
                edited = true;
                result.changes.push(change);
            } else if !result.changes.iter().any(|c| same_detection(c, &change)) {
                result.changes.push(change);
            }
        }
        text = semantic.text;

        if !edited {
            break;
        }
    }

    if parsed && options.aggressive {
        let pass = Instant::now();
        let structural = reorganize::reorganize(&text);
        result.timings.structural = pass.elapsed();

        result.changes.extend(structural.changes);
        result.errors.extend(structural.errors);
        if let Some(reorganized) = structural.text {
            text = reorganized;
            let gate = parse_gate::check(&text);
            if !gate.passed() {
                result.errors.extend(gate.errors);
                parsed = false;
            }
        }
    }

    confidence::score_all(&mut result.changes, &options.confidence_bands);
    result.confidence = confidence::aggregate(&result.changes);
    result.errors.sort();
    let detected = result
        .changes
        .iter()
        .any(|c| !c.is_edit() && c.severity >= Severity::Error);
    result.is_valid =
        parsed && !detected && !result.errors.iter().any(|e| e.severity >= Severity::Error);
    result.fixed = text;
    result.timings.total = start.elapsed();

    log::info!(
        "Fixed {} in {:?}: {} changes, {} errors, {} iterations, valid: {}",
        path,
        result.timings.total,
        result.changes.len(),
        result.errors.len(),
        result.iterations,
        result.is_valid
    );
    result
}

/// A detection-only change already recorded by an earlier iteration.
fn same_detection(a: &Change, b: &Change) -> bool {
    a.category == b.category && a.line == b.line && a.original == b.original
}

/// Validate a document stream without rewriting it.
pub fn validate(content: &str, options: &ValidateOptions) -> ValidationReport {
    validate_with_path(content, "<inline>", options)
}

/// Validate a document stream with a path for messages.
pub fn validate_with_path(
    content: &str,
    path: &str,
    options: &ValidateOptions,
) -> ValidationReport {
    let step = options.normalized().indent_step;

    let syntax = normalizer::normalize(content, step);
    let mut errors = syntax.errors;
    errors.extend(syntax.changes.iter().map(syntax_error));
    errors.extend(parse_gate::check(content).errors);

    let indented = indent::reconstruct(&syntax.text, step);
    errors.extend(indented.changes.iter().map(Change::to_validation_error));
    if parse_gate::is_parseable(&indented.text) {
        errors.extend(
            semantic::detect_duplicates(&indented.text, step)
                .iter()
                .map(Change::to_validation_error),
        );
    }

    errors.sort();
    let valid = !errors.iter().any(|e| e.severity >= Severity::Error);
    log::debug!("Validated {}: {} findings, valid: {}", path, errors.len(), valid);

    ValidationReport {
        file_path: path.to_string(),
        valid,
        errors,
    }
}

fn syntax_error(change: &Change) -> ValidationError {
    let error = change.to_validation_error();
    if change.category == FixCategory::Indentation && change.evidence == Evidence::Mechanical {
        ValidationError {
            code: ErrorCode::TabIndent,
            ..error
        }
    } else {
        error
    }
}
