//! Output formatters for yamlfix results.
//!
//! - Stylish - Colored terminal output (default)
//! - JSON - The service response shape, one object per file
//! - Diff - Before/after lines for every change

pub mod diff;
pub mod json;
pub mod stylish;

use crate::analyzer::yamlfix::fixer::{FixResult, ValidationReport};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Stylish colored terminal output (default)
    #[default]
    Stylish,
    /// JSON format for machine processing
    Json,
    /// Line-level before/after of each change
    Diff,
}

impl OutputFormat {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "stylish" => Some(Self::Stylish),
            "json" => Some(Self::Json),
            "diff" => Some(Self::Diff),
            _ => None,
        }
    }
}

/// Format fix results according to the specified format.
pub fn format_fix_results(results: &[FixResult], format: OutputFormat) -> String {
    match format {
        OutputFormat::Stylish => stylish::format_fixes(results),
        OutputFormat::Json => json::format_fixes(results),
        OutputFormat::Diff => diff::format(results),
    }
}

/// Format validation reports. Reports carry no edits, so `Diff` renders
/// like `Stylish`.
pub fn format_validation_reports(reports: &[ValidationReport], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_reports(reports),
        OutputFormat::Stylish | OutputFormat::Diff => stylish::format_reports(reports),
    }
}
