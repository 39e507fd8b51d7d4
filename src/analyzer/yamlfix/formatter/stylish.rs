//! Stylish (colored terminal) output formatter for yamlfix.

use colored::Colorize;

use crate::analyzer::yamlfix::fixer::{FixResult, ValidationReport};
use crate::analyzer::yamlfix::types::{Severity, ValidationError};

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Critical => "critical".red().bold().to_string(),
        Severity::Error => "error".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
    }
}

fn location(error: &ValidationError) -> String {
    match error.column {
        Some(column) => format!("{}:{}", error.line, column),
        None => error.line.to_string(),
    }
}

fn push_error(output: &mut String, error: &ValidationError) {
    let fixable = if error.fixable { " (fixable)" } else { "" };
    output.push_str(&format!(
        "  {}  {}  {}  {}{}\n",
        location(error).dimmed(),
        severity_label(error.severity),
        error.message,
        error.code.as_str().dimmed(),
        fixable
    ));
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

/// Format fix results: every change with its confidence, then the defects
/// left unfixed.
pub fn format_fixes(results: &[FixResult]) -> String {
    let mut output = String::new();
    let mut total_fixed = 0;
    let mut total_review = 0;
    let mut total_errors = 0;
    let mut invalid_files = 0;

    for result in results {
        if !result.is_valid {
            invalid_files += 1;
        }
        if result.changes.is_empty() && result.errors.is_empty() {
            continue;
        }

        output.push_str(&format!("\n{}\n", result.file_path.bold()));

        for change in &result.changes {
            let review = if change.confidence < result.threshold {
                total_review += 1;
                format!(" {}", "(needs review)".yellow())
            } else {
                String::new()
            };
            output.push_str(&format!(
                "  {}  {}  {}  {}  {:.2}{}\n",
                change.line.to_string().dimmed(),
                severity_label(change.severity),
                change.reason,
                change.category.as_str().dimmed(),
                change.confidence,
                review
            ));
        }

        for error in &result.errors {
            push_error(&mut output, error);
        }

        total_fixed += result.fixed_count();
        total_errors += result.errors.len();
    }

    if total_fixed > 0 || total_errors > 0 || invalid_files > 0 {
        output.push('\n');
        let mut parts = vec![plural(total_fixed, "fix", "fixes")];
        if total_errors > 0 {
            parts.push(plural(total_errors, "unfixed problem", "unfixed problems"));
        }
        output.push_str(&format!("  {}\n", parts.join(", ")));

        if total_review > 0 {
            output.push_str(&format!(
                "  {} below the confidence threshold\n",
                plural(total_review, "change", "changes")
            ));
        }
        if invalid_files > 0 {
            output.push_str(&format!(
                "  {}\n",
                format!("{} still invalid", plural(invalid_files, "file", "files")).red()
            ));
        }
    }

    output
}

/// Format validation reports in the lint layout.
pub fn format_reports(reports: &[ValidationReport]) -> String {
    let mut output = String::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut total_fixable = 0;

    for report in reports {
        if report.errors.is_empty() {
            continue;
        }

        output.push_str(&format!("\n{}\n", report.file_path.bold()));
        for error in &report.errors {
            push_error(&mut output, error);
            if error.fixable {
                total_fixable += 1;
            }
        }
        total_errors += report.error_count();
        total_warnings += report.warning_count();
    }

    if total_errors > 0 || total_warnings > 0 {
        output.push('\n');

        let mut parts = Vec::new();
        if total_errors > 0 {
            parts.push(plural(total_errors, "error", "errors"));
        }
        if total_warnings > 0 {
            parts.push(plural(total_warnings, "warning", "warnings"));
        }
        output.push_str(&format!(
            "  {} problem{}\n",
            parts.join(" and "),
            if total_errors + total_warnings == 1 { "" } else { "s" }
        ));

        if total_fixable > 0 {
            output.push_str(&format!(
                "  {} potentially fixable with `yamlfix fix`\n",
                if total_fixable == 1 {
                    "1 is".to_string()
                } else {
                    format!("{} are", total_fixable)
                }
            ));
        }
    }

    output
}
