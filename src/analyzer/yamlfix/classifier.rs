//! Line classification.
//!
//! Computes indent, trimmed content, structural class, key and value for each
//! physical line. Block scalars are tracked with an explicit state machine so
//! their bodies are never mistaken for structure.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::yamlfix::types::{LineClass, LineRecord};

/// Plain keys eligible for tight-colon detection and typo correction.
static IDENTIFIER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_.$/\-]*$").unwrap());

/// `|`, `>`, `|-`, `>+`, `|2`, `>-2`, `|2-`, optionally followed by a comment.
static BLOCK_SCALAR_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[|>]([+-]?[1-9]?|[1-9][+-])(\s+#.*)?$").unwrap());

/// Block-scalar tracking across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarState {
    #[default]
    Normal,
    /// An opener was seen; the body indent is set by the first deeper line.
    AwaitingBody { opener_indent: usize },
    InBody { opener_indent: usize, body_indent: usize },
}

impl ScalarState {
    /// Start a block scalar whose key sits at `opener_indent`.
    pub fn open(&mut self, opener_indent: usize) {
        *self = Self::AwaitingBody { opener_indent };
    }

    /// Feed one line. Returns true when the line belongs to the scalar body.
    ///
    /// Blank lines never end a block scalar; a non-blank line at or below
    /// the opener's indent does.
    pub fn advance(&mut self, indent: usize, blank: bool) -> bool {
        match *self {
            Self::Normal => false,
            Self::AwaitingBody { opener_indent } => {
                if blank {
                    true
                } else if indent > opener_indent {
                    *self = Self::InBody {
                        opener_indent,
                        body_indent: indent,
                    };
                    true
                } else {
                    *self = Self::Normal;
                    false
                }
            }
            Self::InBody { opener_indent, .. } => {
                if blank || indent > opener_indent {
                    true
                } else {
                    *self = Self::Normal;
                    false
                }
            }
        }
    }
}

/// A key/value split of line content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySplit<'a> {
    pub key: &'a str,
    /// Value without surrounding whitespace or trailing comment.
    pub value: &'a str,
    /// Trailing comment including the `#`.
    pub comment: Option<&'a str>,
    /// Byte offset of the separator colon.
    pub colon: usize,
    /// The colon is directly followed by the value (`key:value`).
    pub tight: bool,
}

/// Whether `key` is a plain identifier-like key.
pub fn is_identifier_key(key: &str) -> bool {
    IDENTIFIER_KEY.is_match(key)
}

/// Whether `value` opens a block scalar.
pub fn is_block_scalar_marker(value: &str) -> bool {
    BLOCK_SCALAR_MARKER.is_match(value.trim())
}

/// Width of leading whitespace with tabs expanded to `tab_width`.
pub fn leading_width(line: &str, tab_width: usize) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Leading whitespace as a string slice.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..end]
}

/// Split a list item into its body.
///
/// Returns the body and the byte offset where it starts within `content`.
/// `-x` is accepted as an unspaced item; `--`, `---` and negative numbers
/// are not list items.
pub fn list_item_body(content: &str) -> Option<(&str, usize)> {
    let rest = content.strip_prefix('-')?;
    match rest.chars().next() {
        None => Some(("", 1)),
        Some(c) if c == ' ' || c == '\t' => {
            let body = rest.trim_start();
            Some((body, content.len() - body.len()))
        }
        Some(c) if c == '-' || c == '.' || c.is_ascii_digit() => None,
        Some(_) => Some((rest, 1)),
    }
}

/// Byte offset where key/value content starts (after indent and any `- `).
pub fn content_start(line: &str) -> usize {
    let ws = leading_whitespace(line).len();
    match list_item_body(&line[ws..]) {
        Some((_, offset)) => ws + offset,
        None => ws,
    }
}

/// Byte range of the value in `line`, trailing comment excluded.
pub fn value_span(line: &str) -> Option<(usize, usize)> {
    let start = content_start(line);
    let split = split_key_value(&line[start..])?;
    if split.value.is_empty() {
        return None;
    }
    let after = &line[start + split.colon + 1..];
    let begin = start + split.colon + 1 + (after.len() - after.trim_start().len());
    Some((begin, begin + split.value.len()))
}

/// Open `key:` parents, innermost last.
#[derive(Debug, Default)]
pub struct ParentStack(Vec<(usize, String)>);

impl ParentStack {
    /// Drop parents that a line at `indent` has left.
    pub fn enter(&mut self, indent: usize) {
        while self.0.last().is_some_and(|(i, _)| *i >= indent) {
            self.0.pop();
        }
    }

    /// Open `record` as a parent when it expects children.
    pub fn push(&mut self, record: &LineRecord) {
        if !record.expects_children() {
            return;
        }
        if let Some(key) = &record.key {
            let column = if record.is_list_item() {
                record.indent + content_start(record.raw.trim_start())
            } else {
                record.indent
            };
            self.0.push((column, key.clone()));
        }
    }

    pub fn parent(&self) -> Option<&str> {
        self.0.last().map(|(_, k)| k.as_str())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Find the key/value separator in line content (list marker already removed).
///
/// The separator is the first unquoted colon followed by whitespace or end
/// of line. A colon glued to its value counts only after an identifier-like
/// key and never as a URL scheme (`http://`).
pub fn split_key_value(content: &str) -> Option<KeySplit<'_>> {
    if content.starts_with(['{', '[', '#']) {
        return None;
    }

    let bytes = content.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut comment_start = content.len();
    let mut separator: Option<(usize, bool)> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\\' if in_double => {
                i += 2;
                continue;
            }
            b'"' if !in_single => in_double = !in_double,
            b'\'' if !in_double => in_single = !in_single,
            b'#' if !in_single && !in_double && (i == 0 || bytes[i - 1].is_ascii_whitespace()) => {
                comment_start = i;
                break;
            }
            b':' if !in_single && !in_double && separator.is_none() => {
                let next = bytes.get(i + 1);
                match next {
                    None => separator = Some((i, false)),
                    Some(n) if n.is_ascii_whitespace() => separator = Some((i, false)),
                    Some(_) => {
                        let key = content[..i].trim();
                        let url = content[i + 1..].starts_with("//");
                        if !url && is_identifier_key(key) {
                            separator = Some((i, true));
                        }
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    let (colon, tight) = separator?;
    if colon >= comment_start {
        return None;
    }
    let key = content[..colon].trim();
    if key.is_empty() {
        return None;
    }
    let value = content[colon + 1..comment_start].trim();
    let comment = (comment_start < content.len()).then(|| content[comment_start..].trim_end());

    Some(KeySplit {
        key,
        value,
        comment,
        colon,
        tight,
    })
}

/// Stateful per-line classifier.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    tab_width: usize,
    scalar: ScalarState,
}

impl LineClassifier {
    pub fn new(tab_width: usize) -> Self {
        Self {
            tab_width,
            scalar: ScalarState::Normal,
        }
    }

    /// Current block-scalar state.
    pub fn scalar_state(&self) -> ScalarState {
        self.scalar
    }

    /// Rewind block-scalar state, e.g. to reclassify a line after an edit.
    pub fn restore(&mut self, state: ScalarState) {
        self.scalar = state;
    }

    /// Classify one line, carrying block-scalar state to the next call.
    pub fn classify(&mut self, number: usize, raw: &str) -> LineRecord {
        let indent = leading_width(raw, self.tab_width);
        let content = raw.trim();
        let blank = content.is_empty();

        let mut record = LineRecord {
            number,
            raw: raw.to_string(),
            indent,
            class: LineClass::Blank,
            key: None,
            value: None,
            tight_colon: false,
        };

        if self.scalar.advance(indent, blank) {
            if !blank {
                record.class = LineClass::BlockScalarBody;
            }
            return record;
        }
        if blank {
            return record;
        }
        if content.starts_with('#') {
            record.class = LineClass::Comment;
            return record;
        }
        if content == "---" || content.starts_with("--- ") || content == "..." {
            record.class = LineClass::DocumentSeparator;
            return record;
        }

        let (body, key_column, is_item) = match list_item_body(content) {
            Some((body, offset)) => (body, indent + offset, true),
            None => (content, indent, false),
        };

        record.class = if is_item {
            LineClass::ListItem
        } else {
            LineClass::BareToken
        };

        if let Some(split) = split_key_value(body) {
            record.key = Some(split.key.to_string());
            record.value = (!split.value.is_empty()).then(|| split.value.to_string());
            record.tight_colon = split.tight;

            if is_block_scalar_marker(split.value) && !split.tight {
                record.class = LineClass::BlockScalarOpener;
                self.scalar.open(key_column);
            } else if !is_item {
                record.class = LineClass::KeyValue;
            }
        } else if is_item && !body.is_empty() {
            record.value = Some(body.to_string());
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_lines(text: &str, tab_width: usize) -> Vec<LineRecord> {
        let mut classifier = LineClassifier::new(tab_width);
        text.lines()
            .enumerate()
            .map(|(idx, line)| classifier.classify(idx + 1, line))
            .collect()
    }

    fn classes(text: &str) -> Vec<LineClass> {
        classify_lines(text, 2).into_iter().map(|r| r.class).collect()
    }

    #[test]
    fn test_basic_classes() {
        let text = "apiVersion: v1\n\n# comment\nmetadata:\n  name: web\n---\nkind Pod\n- item\n";
        assert_eq!(
            classes(text),
            vec![
                LineClass::KeyValue,
                LineClass::Blank,
                LineClass::Comment,
                LineClass::KeyValue,
                LineClass::KeyValue,
                LineClass::DocumentSeparator,
                LineClass::BareToken,
                LineClass::ListItem,
            ]
        );
    }

    #[test]
    fn test_key_value_extraction() {
        let records = classify_lines("  image: nginx:1.25  # pinned\n", 2);
        let r = &records[0];
        assert_eq!(r.indent, 2);
        assert_eq!(r.key.as_deref(), Some("image"));
        assert_eq!(r.value.as_deref(), Some("nginx:1.25"));
        assert!(!r.tight_colon);
    }

    #[test]
    fn test_opener_has_no_value() {
        let records = classify_lines("spec:\n", 2);
        assert_eq!(records[0].class, LineClass::KeyValue);
        assert!(records[0].value.is_none());
        assert!(records[0].expects_children());
    }

    #[test]
    fn test_tight_colon() {
        let split = split_key_value("image:nginx").unwrap();
        assert_eq!(split.key, "image");
        assert_eq!(split.value, "nginx");
        assert!(split.tight);
    }

    #[test]
    fn test_url_is_not_a_separator() {
        assert!(split_key_value("http://example.com").is_none());

        let split = split_key_value("url: http://example.com").unwrap();
        assert_eq!(split.key, "url");
        assert_eq!(split.value, "http://example.com");
    }

    #[test]
    fn test_quoted_colon_ignored() {
        assert!(split_key_value("\"8080:80\"").is_none());
        let split = split_key_value("\"a:b\": c").unwrap();
        assert_eq!(split.key, "\"a:b\"");
        assert_eq!(split.value, "c");
    }

    #[test]
    fn test_comment_before_colon() {
        assert!(split_key_value("value # note: x").is_none());
    }

    #[test]
    fn test_list_item_body() {
        assert_eq!(list_item_body("- name: a"), Some(("name: a", 2)));
        assert_eq!(list_item_body("-"), Some(("", 1)));
        assert_eq!(list_item_body("-x"), Some(("x", 1)));
        assert_eq!(list_item_body("---"), None);
        assert_eq!(list_item_body("-1"), None);
        assert_eq!(list_item_body("name"), None);
    }

    #[test]
    fn test_list_item_key() {
        let records = classify_lines("  - name: nginx\n  - name nginx\n", 2);
        assert_eq!(records[0].class, LineClass::ListItem);
        assert_eq!(records[0].key.as_deref(), Some("name"));
        assert_eq!(records[1].class, LineClass::ListItem);
        assert_eq!(records[1].key, None);
        assert_eq!(records[1].value.as_deref(), Some("name nginx"));
    }

    #[test]
    fn test_block_scalar_body() {
        let text = "data:\n  script: |\n    echo: hi\n\n    - not a list\n  other: x\n";
        assert_eq!(
            classes(text),
            vec![
                LineClass::KeyValue,
                LineClass::BlockScalarOpener,
                LineClass::BlockScalarBody,
                LineClass::Blank,
                LineClass::BlockScalarBody,
                LineClass::KeyValue,
            ]
        );
    }

    #[test]
    fn test_block_scalar_at_top_of_file() {
        let text = "description: >-\n  folded text\nkind: Pod\n";
        assert_eq!(
            classes(text),
            vec![
                LineClass::BlockScalarOpener,
                LineClass::BlockScalarBody,
                LineClass::KeyValue,
            ]
        );
    }

    #[test]
    fn test_empty_block_scalar() {
        let text = "a: |\nb: c\n";
        assert_eq!(classes(text), vec![LineClass::BlockScalarOpener, LineClass::KeyValue]);
    }

    #[test]
    fn test_list_item_block_scalar_uses_key_column() {
        let text = "- run: |\n    echo hi\n  name: x\n";
        assert_eq!(
            classes(text),
            vec![
                LineClass::BlockScalarOpener,
                LineClass::BlockScalarBody,
                LineClass::KeyValue,
            ]
        );
    }

    #[test]
    fn test_scalar_state_transitions() {
        let mut state = ScalarState::default();
        assert!(!state.advance(4, false));

        state.open(2);
        assert!(state.advance(0, true));
        assert_eq!(state, ScalarState::AwaitingBody { opener_indent: 2 });
        assert!(state.advance(4, false));
        assert_eq!(
            state,
            ScalarState::InBody {
                opener_indent: 2,
                body_indent: 4
            }
        );
        assert!(state.advance(6, false));
        assert!(!state.advance(2, false));
        assert_eq!(state, ScalarState::Normal);
    }

    #[test]
    fn test_block_marker() {
        assert!(is_block_scalar_marker("|"));
        assert!(is_block_scalar_marker(">-"));
        assert!(is_block_scalar_marker("|+"));
        assert!(is_block_scalar_marker("|2"));
        assert!(is_block_scalar_marker("| # script"));
        assert!(!is_block_scalar_marker("|x"));
        assert!(!is_block_scalar_marker("value"));
    }

    #[test]
    fn test_tab_width() {
        assert_eq!(leading_width("\t\tname: a", 2), 4);
        assert_eq!(leading_width(" \tname: a", 4), 5);
        assert_eq!(leading_whitespace("\t name"), "\t ");
    }

    #[test]
    fn test_content_start() {
        assert_eq!(content_start("name: a"), 0);
        assert_eq!(content_start("  name: a"), 2);
        assert_eq!(content_start("  - name: a"), 4);
        assert_eq!(content_start("-name: a"), 1);
    }

    #[test]
    fn test_value_span_excludes_comment() {
        let line = "  name: web  # primary";
        let (start, end) = value_span(line).unwrap();
        assert_eq!(&line[start..end], "web");

        let line = "- image: nginx";
        let (start, end) = value_span(line).unwrap();
        assert_eq!(&line[start..end], "nginx");

        assert!(value_span("spec:").is_none());
        assert!(value_span("just text").is_none());
    }

    #[test]
    fn test_parent_stack() {
        let records = classify_lines(
            "metadata:\n  labels:\n    app: web\nspec:\n  containers:\n    - name: a\n",
            2,
        );
        let mut parents = ParentStack::default();
        let mut seen = Vec::new();
        for record in &records {
            parents.enter(record.indent);
            seen.push(parents.parent().map(str::to_string));
            parents.push(record);
        }

        assert_eq!(seen[0], None);
        assert_eq!(seen[1].as_deref(), Some("metadata"));
        assert_eq!(seen[2].as_deref(), Some("labels"));
        assert_eq!(seen[3], None);
        assert_eq!(seen[5].as_deref(), Some("containers"));

        parents.clear();
        assert!(parents.parent().is_none());
    }
}
