//! Phase 5: indentation reconstruction.
//!
//! A single left-to-right pass that assigns every structural line a new
//! indent from a stack of open nesting levels. Each level remembers both the
//! indent it had in the input and the indent it was given, so arbitrary or
//! inconsistent input widths map onto a uniform step. Works on text that
//! does not parse.

use crate::analyzer::yamlfix::classifier::{LineClassifier, content_start, leading_whitespace};
use crate::analyzer::yamlfix::knowledge::is_top_level_field;
use crate::analyzer::yamlfix::normalizer::join_lines;
use crate::analyzer::yamlfix::types::{
    Change, Evidence, FixCategory, LineClass, LineRecord, Phase, Severity,
};

/// Output of the reconstruction pass.
#[derive(Debug, Clone, Default)]
pub struct IndentOutcome {
    pub text: String,
    pub changes: Vec<Change>,
}

/// One open nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Level {
    orig: usize,
    new: usize,
    /// List items were placed at this level.
    sequence: bool,
}

/// The last structural line placed.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    orig: usize,
    new: usize,
    expects_children: bool,
    list_item: bool,
    /// Width of `- ` before the item's content.
    item_offset: usize,
}

impl Anchor {
    /// Column where the anchor's own content (and nested keys) start.
    fn content_column(&self) -> usize {
        if self.list_item {
            self.new + self.item_offset
        } else {
            self.new
        }
    }
}

/// Per-document working state.
#[derive(Debug)]
struct IndentContext {
    step: usize,
    stack: Vec<Level>,
    prev: Option<Anchor>,
    /// Last `key: value` line, for plain-scalar continuations.
    scalar: Option<(usize, usize)>,
    /// Shift applied to the current block-scalar body.
    body_shift: isize,
}

impl IndentContext {
    fn new(step: usize) -> Self {
        Self {
            step,
            stack: vec![Level {
                orig: 0,
                new: 0,
                sequence: false,
            }],
            prev: None,
            scalar: None,
            body_shift: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.step);
    }

    fn top(&self) -> Level {
        self.stack.last().copied().unwrap_or(Level {
            orig: 0,
            new: 0,
            sequence: false,
        })
    }

    /// Whether a bare line continues the previous plain scalar.
    fn continuation(&self, record: &LineRecord) -> Option<usize> {
        if record.class != LineClass::BareToken {
            return None;
        }
        let (orig, new) = self.scalar?;
        (record.indent > orig).then(|| new + (record.indent - orig))
    }

    /// Choose the indent of a structural line and update the stack.
    fn place(&mut self, record: &LineRecord) -> (usize, Evidence) {
        let orig = record.indent;
        let list_item = record.is_list_item();
        let top_level_key = record.key.as_deref().is_some_and(is_top_level_field);

        // Envelope fields at column zero always close every open level.
        if orig == 0 && !list_item && top_level_key {
            self.stack.truncate(1);
            return (0, Evidence::Context);
        }

        if let Some(prev) = self.prev
            && prev.expects_children
            && orig >= prev.orig
        {
            let target = prev.content_column() + self.step;
            self.stack.push(Level {
                orig,
                new: target,
                sequence: list_item,
            });
            return (target, Evidence::Context);
        }

        if list_item {
            return self.place_list_item(orig);
        }

        if let Some(prev) = self.prev
            && prev.list_item
            && orig > prev.orig
            && !top_level_key
        {
            let target = prev.content_column();
            self.stack.push(Level {
                orig,
                new: target,
                sequence: false,
            });
            return (target, Evidence::Inference);
        }

        while self.stack.len() > 1 {
            let top = self.top();
            if orig < top.orig || (top.sequence && orig <= top.orig) {
                self.stack.pop();
            } else {
                break;
            }
        }
        let top = self.top();
        let evidence = if orig == top.orig {
            Evidence::Context
        } else {
            Evidence::Inference
        };
        (top.new, evidence)
    }

    /// Snap a list item to the nearest open level within one step.
    fn place_list_item(&mut self, orig: usize) -> (usize, Evidence) {
        let nearest = self
            .stack
            .iter()
            .enumerate()
            .filter(|(_, level)| level.orig.abs_diff(orig) <= self.step)
            .min_by_key(|(_, level)| (level.orig.abs_diff(orig), !level.sequence))
            .map(|(i, _)| i);

        if let Some(i) = nearest {
            self.stack.truncate(i + 1);
            self.stack[i].sequence = true;
            return (self.stack[i].new, Evidence::Inference);
        }

        while self.stack.len() > 1 && self.top().orig > orig {
            self.stack.pop();
        }
        (self.top().new, Evidence::Inference)
    }

    /// Remember a placed line for the decisions on following lines.
    fn record(&mut self, record: &LineRecord, target: usize) {
        let list_item = record.is_list_item();
        let opener = record.class == LineClass::BlockScalarOpener;

        self.prev = Some(Anchor {
            orig: record.indent,
            new: target,
            expects_children: !opener && record.expects_children(),
            list_item,
            item_offset: if list_item {
                content_start(record.raw.trim_start())
            } else {
                0
            },
        });

        self.scalar = match record.class {
            LineClass::KeyValue | LineClass::ListItem if record.value.is_some() => {
                Some((record.indent, target))
            }
            _ => None,
        };

        if opener {
            self.body_shift = target as isize - record.indent as isize;
        }
    }
}

/// Re-indent `text` with `step` spaces per nesting level.
pub fn reconstruct(text: &str, step: usize) -> IndentOutcome {
    let step = step.max(1);
    let mut classifier = LineClassifier::new(step);
    let mut ctx = IndentContext::new(step);
    let mut lines = Vec::new();
    let mut changes = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let record = classifier.classify(number, raw);

        let (target, evidence) = match record.class {
            class if class.is_exempt() => {
                if class == LineClass::DocumentSeparator {
                    ctx.reset();
                }
                lines.push(raw.to_string());
                continue;
            }
            LineClass::BlockScalarBody => {
                let shifted = (record.indent as isize + ctx.body_shift).max(0) as usize;
                (shifted, Evidence::Context)
            }
            _ => match ctx.continuation(&record) {
                Some(target) => (target, Evidence::Inference),
                None => {
                    let placed = ctx.place(&record);
                    ctx.record(&record, placed.0);
                    placed
                }
            },
        };

        let body = &raw[leading_whitespace(raw).len()..];
        let line = format!("{}{}", " ".repeat(target), body);
        if line != raw {
            log::trace!("line {}: indent {} -> {}", number, record.indent, target);
            changes.push(
                Change::new(
                    number,
                    raw,
                    line.clone(),
                    FixCategory::Indentation,
                    Severity::Warning,
                    format!("Re-indented from {} to {} spaces", record.indent, target),
                )
                .with_evidence(evidence)
                .with_phase(Phase::Indentation),
            );
        }
        lines.push(line);
    }

    log::debug!("indentation pass: {} lines re-indented", changes.len());
    IndentOutcome {
        text: join_lines(&lines, text),
        changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(text: &str) -> String {
        reconstruct(text, 2).text
    }

    #[test]
    fn test_canonical_document_unchanged() {
        let text = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n  labels:\n    app: web\nspec:\n  replicas: 3\n  template:\n    spec:\n      containers:\n        - name: web\n          image: nginx\n          ports:\n            - containerPort: 80\n";
        let outcome = reconstruct(text, 2);
        assert_eq!(outcome.text, text);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn test_mixed_widths_normalized() {
        let text = "spec:\n containers:\n   - name: web\n     image: nginx\n restartPolicy: Always\n";
        let expected = "spec:\n  containers:\n    - name: web\n      image: nginx\n  restartPolicy: Always\n";
        let outcome = reconstruct(text, 2);
        assert_eq!(outcome.text, expected);
        assert_eq!(outcome.changes.len(), 4);
        assert!(outcome.changes.iter().all(|c| c.category == FixCategory::Indentation));
        assert!(outcome.changes.iter().all(|c| c.severity == Severity::Warning));
    }

    #[test]
    fn test_child_of_opener_nested() {
        assert_eq!(fixed("metadata:\nname: web\n"), "metadata:\n  name: web\n");
    }

    #[test]
    fn test_top_level_field_returns_to_root() {
        let text = "metadata:\nname: web\nspec:\n  replicas: 2\n";
        assert_eq!(fixed(text), "metadata:\n  name: web\nspec:\n  replicas: 2\n");
    }

    #[test]
    fn test_configured_step() {
        let text = "spec:\n  containers:\n  - name: web\n    image: nginx\n";
        let expected = "spec:\n    containers:\n        - name: web\n          image: nginx\n";
        assert_eq!(reconstruct(text, 4).text, expected);
    }

    #[test]
    fn test_sibling_list_items_aligned() {
        let text = "containers:\n- name: a\n  image: x\n - name: b\n   image: y\n";
        let expected = "containers:\n  - name: a\n    image: x\n  - name: b\n    image: y\n";
        assert_eq!(fixed(text), expected);
    }

    #[test]
    fn test_key_after_list_returns_to_parent() {
        let text = "spec:\n  containers:\n  - name: a\n    image: x\n  volumes: []\n";
        let expected = "spec:\n  containers:\n    - name: a\n      image: x\n  volumes: []\n";
        assert_eq!(fixed(text), expected);
    }

    #[test]
    fn test_over_indented_sibling_snapped() {
        let text = "metadata:\n  name: web\n     namespace: prod\n";
        assert_eq!(fixed(text), "metadata:\n  name: web\n  namespace: prod\n");
    }

    #[test]
    fn test_block_scalar_body_shifted_with_opener() {
        let text = "data:\n   script: |\n      echo one\n        echo two\n";
        let expected = "data:\n  script: |\n     echo one\n       echo two\n";
        assert_eq!(fixed(text), expected);
    }

    #[test]
    fn test_block_scalar_body_verbatim_when_opener_stays() {
        let text = "data:\n  script: |\n      odd:   indent\n   - kept\n";
        let outcome = reconstruct(text, 2);
        assert_eq!(outcome.text, text);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn test_continuation_keeps_relative_offset() {
        let text = "metadata:\n   description: a long\n     wrapped value\n";
        let expected = "metadata:\n  description: a long\n    wrapped value\n";
        assert_eq!(fixed(text), expected);
    }

    #[test]
    fn test_comments_and_blanks_untouched() {
        let text = "spec:\n      # note\n\n   replicas: 2\n";
        assert_eq!(fixed(text), "spec:\n      # note\n\n  replicas: 2\n");
    }

    #[test]
    fn test_document_separator_resets() {
        let text = "spec:\n   replicas: 2\n---\n  kind: Pod\n";
        assert_eq!(fixed(text), "spec:\n  replicas: 2\n---\nkind: Pod\n");
    }

    #[test]
    fn test_change_records_line_text() {
        let outcome = reconstruct("spec:\n replicas: 2\n", 2);
        assert_eq!(outcome.changes.len(), 1);
        let change = &outcome.changes[0];
        assert_eq!(change.line, 2);
        assert_eq!(change.original, " replicas: 2");
        assert_eq!(change.fixed, "  replicas: 2");
        assert_eq!(change.phase, Phase::Indentation);
        assert_eq!(change.evidence, Evidence::Context);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let text = "apiVersion: v1\nkind: Pod\nmetadata:\n name: x\nspec:\n   containers:\n     - name: a\n       image: b\n       ports:\n       - containerPort: 80\n";
        let once = fixed(text);
        let twice = reconstruct(&once, 2);
        assert_eq!(twice.text, once);
        assert!(twice.changes.is_empty());
    }
}
