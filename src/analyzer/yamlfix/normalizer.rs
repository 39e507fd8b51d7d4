//! Phase 1: line-local syntax normalization.
//!
//! Always runs and never requires the input to parse. Each line goes through
//! a fixed sequence of rules; every rule that modifies the line records one
//! `Change` with the text before and after that rule. Block-scalar bodies are
//! passed through untouched.

use crate::analyzer::yamlfix::classifier::{
    LineClassifier, ParentStack, content_start, is_identifier_key, leading_whitespace,
    leading_width, list_item_body, split_key_value,
};
use crate::analyzer::yamlfix::knowledge::{
    self, is_freeform_parent, is_string_list_parent, resolve_field,
};
use crate::analyzer::yamlfix::types::{
    Change, ErrorCode, Evidence, FixCategory, LineClass, LineRecord, Phase, Severity,
    ValidationError,
};

/// Output of the syntax pass.
#[derive(Debug, Clone, Default)]
pub struct SyntaxOutcome {
    pub text: String,
    pub changes: Vec<Change>,
    /// Defects the pass refused to guess at (unrecognized bare tokens).
    pub errors: Vec<ValidationError>,
}

/// Line-local rules, applied in order.
struct LineRules<'a> {
    number: usize,
    line: String,
    changes: &'a mut Vec<Change>,
}

impl LineRules<'_> {
    fn apply(
        &mut self,
        fixed: Option<String>,
        category: FixCategory,
        severity: Severity,
        evidence: Evidence,
        reason: impl FnOnce() -> String,
    ) {
        let Some(fixed) = fixed else {
            return;
        };
        if fixed == self.line {
            return;
        }
        self.changes.push(
            Change::new(self.number, self.line.clone(), fixed.clone(), category, severity, reason())
                .with_evidence(evidence)
                .with_phase(Phase::Syntax),
        );
        self.line = fixed;
    }
}

/// Normalize raw text. Tabs expand to `tab_width` spaces.
pub fn normalize(content: &str, tab_width: usize) -> SyntaxOutcome {
    let mut outcome = SyntaxOutcome::default();
    let mut classifier = LineClassifier::new(tab_width);
    let mut parents = ParentStack::default();
    let mut scalar_value_indent: Option<usize> = None;
    let mut lines = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let number = idx + 1;
        let expanded = expand_leading_tabs(raw, tab_width);
        let state = classifier.scalar_state();
        let record = classifier.classify(number, &expanded);

        match record.class {
            LineClass::BlockScalarBody => {
                lines.push(raw.to_string());
                continue;
            }
            // Trailing whitespace is stripped without a change record.
            LineClass::Blank => {
                lines.push(String::new());
                continue;
            }
            _ => {}
        }

        let mut rules = LineRules {
            number,
            line: raw.trim_end().to_string(),
            changes: &mut outcome.changes,
        };

        rules.apply(
            Some(expanded.trim_end().to_string()),
            FixCategory::Indentation,
            Severity::Warning,
            Evidence::Mechanical,
            || "Replaced tab indentation with spaces".to_string(),
        );

        match record.class {
            LineClass::Comment => {
                lines.push(rules.line);
                continue;
            }
            LineClass::DocumentSeparator => {
                parents.clear();
                scalar_value_indent = None;
                lines.push(rules.line);
                continue;
            }
            _ => {}
        }

        parents.enter(record.indent);
        let parent = parents.parent().map(str::to_string);
        let freeform = parent.as_deref().is_some_and(is_freeform_parent);
        let string_list = parent.as_deref().is_some_and(is_string_list_parent);
        let continuation = record.class == LineClass::BareToken
            && scalar_value_indent.is_some_and(|i| record.indent > i);

        if record.class == LineClass::BareToken && !continuation {
            match insert_missing_colon(&rules.line, freeform) {
                BareToken::Fixed { line, token, canonical, evidence } => rules.apply(
                    Some(line),
                    FixCategory::MissingColon,
                    Severity::Critical,
                    evidence,
                    || missing_colon_reason(&token, canonical),
                ),
                BareToken::Unknown { token, column } => outcome.errors.push(
                    ValidationError::new(
                        number,
                        format!("Unrecognized field `{}` without a colon", token),
                        ErrorCode::UnknownField,
                    )
                    .with_column(column),
                ),
                BareToken::Skip => {}
            }
        }

        if !continuation {
            let (fixed, evidence) = colon_spacing(&rules.line);
            rules.apply(fixed, FixCategory::ColonSpacing, Severity::Info, evidence, || {
                "Inserted space after colon".to_string()
            });

            rules.apply(
                list_marker_spacing(&rules.line),
                FixCategory::ListSpacing,
                Severity::Info,
                Evidence::Inference,
                || "Inserted space after list marker".to_string(),
            );

            if !string_list
                && let Some((fixed, token, canonical, evidence)) =
                    list_item_missing_colon(&rules.line, freeform)
            {
                rules.apply(
                    Some(fixed),
                    FixCategory::MissingColon,
                    Severity::Critical,
                    evidence,
                    || missing_colon_reason(&token, canonical),
                );
            }

            if !freeform
                && let Some((fixed, key, canonical, evidence)) = key_typo(&rules.line)
            {
                rules.apply(Some(fixed), FixCategory::KeyTypo, Severity::Warning, evidence, || {
                    format!("Corrected field `{}` to `{}`", key, canonical)
                });
            }
        }

        rules.apply(
            close_quote(&rules.line),
            FixCategory::QuoteBalance,
            Severity::Critical,
            Evidence::Pattern,
            || "Closed unbalanced quote".to_string(),
        );

        let line = rules.line;
        let record = if line == expanded.trim_end() {
            record
        } else {
            classifier.restore(state);
            classifier.classify(number, &line)
        };

        track_context(&record, &mut parents, &mut scalar_value_indent);
        lines.push(line);
    }

    outcome.text = join_lines(&lines, content);
    log::debug!(
        "syntax pass: {} changes, {} unrecoverable tokens",
        outcome.changes.len(),
        outcome.errors.len()
    );
    outcome
}

/// Update parent and continuation tracking after a line is final.
fn track_context(
    record: &LineRecord,
    parents: &mut ParentStack,
    scalar_value_indent: &mut Option<usize>,
) {
    match record.class {
        LineClass::BareToken => return,
        LineClass::KeyValue | LineClass::ListItem if record.value.is_some() => {
            *scalar_value_indent = Some(record.indent);
        }
        _ => *scalar_value_indent = None,
    }
    parents.push(record);
}

/// Join `lines` with the line break `original` uses, keeping its final newline.
pub(crate) fn join_lines(lines: &[String], original: &str) -> String {
    let newline = line_break(original);
    let mut text = lines.join(newline);
    if original.ends_with('\n') && !lines.is_empty() {
        text.push_str(newline);
    }
    text
}

/// `\r\n` when the first line of `text` ends with one, else `\n`.
fn line_break(text: &str) -> &'static str {
    match text.find('\n') {
        Some(pos) if text[..pos].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn missing_colon_reason(token: &str, canonical: &str) -> String {
    if token == canonical {
        format!("Inserted missing colon after `{}`", canonical)
    } else {
        format!("Inserted missing colon after `{}` (corrected to `{}`)", token, canonical)
    }
}

/// Replace tabs in leading whitespace with spaces.
fn expand_leading_tabs(line: &str, tab_width: usize) -> String {
    let ws = leading_whitespace(line);
    if !ws.contains('\t') {
        return line.to_string();
    }
    let width = leading_width(ws, tab_width);
    format!("{}{}", " ".repeat(width), &line[ws.len()..])
}

enum BareToken {
    Fixed {
        line: String,
        token: String,
        canonical: &'static str,
        evidence: Evidence,
    },
    Unknown {
        token: String,
        column: usize,
    },
    Skip,
}

/// Rule 3: `apiVersion v1` -> `apiVersion: v1`.
fn insert_missing_colon(line: &str, freeform: bool) -> BareToken {
    let ws = leading_whitespace(line);
    let content = &line[ws.len()..];
    let (token, rest) = match content.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (content, ""),
    };
    if !is_identifier_key(token) {
        return BareToken::Skip;
    }

    match resolve_field(token, !freeform) {
        Some(m) => {
            let line = if rest.is_empty() {
                format!("{}{}:", ws, m.canonical)
            } else {
                format!("{}{}: {}", ws, m.canonical, rest)
            };
            BareToken::Fixed {
                line,
                token: token.to_string(),
                canonical: m.canonical,
                evidence: m.evidence,
            }
        }
        None => BareToken::Unknown {
            token: token.to_string(),
            column: ws.len() + 1,
        },
    }
}

/// Rule 4: `image:nginx` -> `image: nginx`.
fn colon_spacing(line: &str) -> (Option<String>, Evidence) {
    let start = content_start(line);
    let Some(split) = split_key_value(&line[start..]) else {
        return (None, Evidence::Pattern);
    };
    if !split.tight {
        return (None, Evidence::Pattern);
    }
    let at = start + split.colon + 1;
    let evidence = if knowledge::is_known_field(split.key) {
        Evidence::KnownField
    } else {
        Evidence::Pattern
    };
    (Some(format!("{} {}", &line[..at], &line[at..])), evidence)
}

/// Rule 5: `-name: a` -> `- name: a`.
fn list_marker_spacing(line: &str) -> Option<String> {
    let ws = leading_whitespace(line);
    let content = &line[ws.len()..];
    match list_item_body(content) {
        Some((body, 1)) if !body.is_empty() => Some(format!("{}- {}", ws, body)),
        _ => None,
    }
}

/// Rule 6: `- name nginx` -> `- name: nginx`.
fn list_item_missing_colon(
    line: &str,
    freeform: bool,
) -> Option<(String, String, &'static str, Evidence)> {
    let ws = leading_whitespace(line);
    let (body, offset) = list_item_body(&line[ws.len()..])?;
    if offset == 1 || split_key_value(body).is_some() {
        return None;
    }
    let (token, rest) = body.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    if rest.is_empty() || !is_identifier_key(token) {
        return None;
    }
    let m = resolve_field(token, !freeform)?;
    Some((
        format!("{}- {}: {}", ws, m.canonical, rest),
        token.to_string(),
        m.canonical,
        m.evidence,
    ))
}

/// Rule 7: `metdata:` -> `metadata:`.
fn key_typo(line: &str) -> Option<(String, String, &'static str, Evidence)> {
    let start = content_start(line);
    let split = split_key_value(&line[start..])?;
    if !is_identifier_key(split.key) {
        return None;
    }
    let m = resolve_field(split.key, true)?;
    if m.canonical == split.key {
        return None;
    }
    let key_start = start + line[start..].find(split.key)?;
    let fixed = format!(
        "{}{}{}",
        &line[..key_start],
        m.canonical,
        &line[key_start + split.key.len()..]
    );
    Some((fixed, split.key.to_string(), m.canonical, m.evidence))
}

/// Rule 8: append the missing closing quote of a quoted value.
fn close_quote(line: &str) -> Option<String> {
    let start = content_start(line);
    let body = &line[start..];
    let value = match split_key_value(body) {
        Some(split) => {
            let after = &body[split.colon + 1..];
            after.trim_start()
        }
        None => body,
    };

    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let count = if quote == '"' {
        count_unescaped(value, '"')
    } else {
        value.matches('\'').count()
    };
    (count % 2 == 1).then(|| format!("{}{}", line, quote))
}

fn count_unescaped(s: &str, quote: char) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_line(line: &str) -> SyntaxOutcome {
        normalize(line, 2)
    }

    #[test]
    fn test_crlf_line_endings_kept() {
        let out = normalize("apiVersion v1\r\nkind: Pod\r\n", 2);
        assert_eq!(out.text, "apiVersion: v1\r\nkind: Pod\r\n");
        assert_eq!(out.changes.len(), 1);

        let clean = normalize("kind: Pod\r\nmetadata:\r\n  name: web\r\n", 2);
        assert_eq!(clean.text, "kind: Pod\r\nmetadata:\r\n  name: web\r\n");
        assert!(clean.changes.is_empty());
    }

    #[test]
    fn test_missing_colon_known_field() {
        let out = fix_line("apiVersion v1");
        assert_eq!(out.text, "apiVersion: v1");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].category, FixCategory::MissingColon);
        assert_eq!(out.changes[0].severity, Severity::Critical);
        assert_eq!(out.changes[0].original, "apiVersion v1");
    }

    #[test]
    fn test_missing_colon_alias() {
        let out = fix_line("metdata");
        assert_eq!(out.text, "metadata:");
        assert_eq!(out.changes[0].evidence, Evidence::Alias);
    }

    #[test]
    fn test_unknown_bare_token_reported() {
        let out = fix_line("frobnicate now");
        assert_eq!(out.text, "frobnicate now");
        assert!(out.changes.is_empty());
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].code, ErrorCode::UnknownField);
        assert!(!out.errors[0].fixable);
        assert_eq!(out.errors[0].column, Some(1));
    }

    #[test]
    fn test_continuation_line_untouched() {
        let text = "description: a long\n  wrapped sentence\n";
        let out = fix_line(text);
        assert_eq!(out.text, text);
        assert!(out.changes.is_empty());
        assert!(out.errors.is_empty());
    }

    #[test]
    fn test_colon_spacing() {
        let out = fix_line("image:nginx");
        assert_eq!(out.text, "image: nginx");
        assert_eq!(out.changes[0].category, FixCategory::ColonSpacing);
        assert_eq!(out.changes[0].severity, Severity::Info);
        assert_eq!(out.changes[0].evidence, Evidence::KnownField);
    }

    #[test]
    fn test_colon_spacing_skips_urls() {
        let out = fix_line("url: http://example.com");
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_list_marker_spacing() {
        let out = fix_line("containers:\n  -name: web\n");
        assert_eq!(out.text, "containers:\n  - name: web\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].category, FixCategory::ListSpacing);
        assert_eq!(out.changes[0].line, 2);
    }

    #[test]
    fn test_list_item_missing_colon() {
        let out = fix_line("containers:\n  - name nginx\n");
        assert_eq!(out.text, "containers:\n  - name: nginx\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].category, FixCategory::MissingColon);
    }

    #[test]
    fn test_string_list_items_untouched() {
        let text = "args:\n  - port 8080\n";
        let out = fix_line(text);
        assert_eq!(out.text, text);
    }

    #[test]
    fn test_key_typo() {
        let out = fix_line("metdata:\n  name: web\n");
        assert_eq!(out.text, "metadata:\n  name: web\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].category, FixCategory::KeyTypo);
        assert_eq!(out.changes[0].severity, Severity::Warning);
    }

    #[test]
    fn test_key_typo_in_list_item() {
        let out = fix_line("- imgae: nginx\n");
        assert_eq!(out.text, "- image: nginx\n");
    }

    #[test]
    fn test_freeform_keys_untouched() {
        let text = "metadata:\n  labels:\n    lable: x\n    contaner: y\n";
        let out = fix_line(text);
        assert_eq!(out.text, text);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_close_double_quote() {
        let out = fix_line("image: \"nginx:1.25");
        assert_eq!(out.text, "image: \"nginx:1.25\"");
        assert_eq!(out.changes[0].category, FixCategory::QuoteBalance);
        assert_eq!(out.changes[0].severity, Severity::Critical);
    }

    #[test]
    fn test_apostrophe_not_a_quote() {
        let out = fix_line("description: don't panic");
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_tabs_expanded() {
        let out = fix_line("spec:\n\treplicas: 3\n");
        assert_eq!(out.text, "spec:\n  replicas: 3\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].category, FixCategory::Indentation);
        assert_eq!(out.changes[0].evidence, Evidence::Mechanical);
    }

    #[test]
    fn test_trailing_whitespace_silent() {
        let out = fix_line("kind: Pod   \n");
        assert_eq!(out.text, "kind: Pod\n");
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_block_scalar_body_untouched() {
        let text = "data:\n  script: |\n    apiVersion v1\n    -x\n    \"open\n";
        let out = fix_line(text);
        assert_eq!(out.text, text);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn test_rules_chain_on_one_line() {
        let out = fix_line("-imgae:\"nginx");
        assert_eq!(out.text, "- image: \"nginx\"");
        let categories: Vec<FixCategory> = out.changes.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![
                FixCategory::ColonSpacing,
                FixCategory::ListSpacing,
                FixCategory::KeyTypo,
                FixCategory::QuoteBalance,
            ]
        );
        // Each change starts from the previous rule's output.
        for pair in out.changes.windows(2) {
            assert_eq!(pair[0].fixed, pair[1].original);
        }
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(fix_line("").text, "");
        let out = fix_line("   \n\t\n");
        assert!(out.changes.is_empty());
        assert_eq!(out.text, "\n\n");
    }
}
