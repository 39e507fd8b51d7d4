//! Diff output: a unified diff of each modified file, followed by the
//! reason behind every edited line.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use crate::analyzer::yamlfix::fixer::FixResult;

/// Format fix results as unified diffs.
pub fn format(results: &[FixResult]) -> String {
    let mut output = String::new();

    for result in results.iter().filter(|r| r.is_modified()) {
        output.push_str(&format!("--- a/{}", result.file_path).red().to_string());
        output.push('\n');
        output.push_str(&format!("+++ b/{}", result.file_path).green().to_string());
        output.push('\n');

        let diff = TextDiff::from_lines(result.original.as_str(), result.fixed.as_str());
        for group in diff.grouped_ops(2) {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let old = first.old_range().start..last.old_range().end;
            let new = first.new_range().start..last.new_range().end;
            output.push_str(
                &format!(
                    "@@ -{},{} +{},{} @@",
                    old.start + 1,
                    old.len(),
                    new.start + 1,
                    new.len()
                )
                .cyan()
                .to_string(),
            );
            output.push('\n');

            for op in &group {
                for change in diff.iter_changes(op) {
                    let line = change.value().trim_end_matches('\n');
                    let rendered = match change.tag() {
                        ChangeTag::Delete => format!("-{}", line).red().to_string(),
                        ChangeTag::Insert => format!("+{}", line).green().to_string(),
                        ChangeTag::Equal => format!(" {}", line),
                    };
                    output.push_str(&rendered);
                    output.push('\n');
                }
            }
        }

        for change in result.changes.iter().filter(|c| c.is_edit()) {
            output.push_str(&format!(
                "# {}: {} ({}, {:.2})\n",
                change.line,
                change.reason,
                change.category.as_str(),
                change.confidence
            ));
        }
        output.push('\n');
    }

    output
}
