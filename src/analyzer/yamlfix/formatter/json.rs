//! JSON output formatter for yamlfix.

use serde_json::json;

use crate::analyzer::yamlfix::fixer::{FixResult, ValidationReport};
use crate::analyzer::yamlfix::types::{Change, ValidationError};

fn change_json(change: &Change) -> serde_json::Value {
    json!({
        "line": change.line,
        "original": change.original,
        "fixed": change.fixed,
        "category": change.category.as_str(),
        "reason": change.reason,
        "severity": change.severity.as_str(),
        "confidence": change.confidence,
        "phase": change.phase.as_str()
    })
}

fn error_json(error: &ValidationError) -> serde_json::Value {
    json!({
        "line": error.line,
        "column": error.column,
        "severity": error.severity.as_str(),
        "message": error.message,
        "code": error.code.as_str(),
        "fixable": error.fixable
    })
}

/// Format fix results as JSON, one object per input.
pub fn format_fixes(results: &[FixResult]) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|result| {
            let changes: Vec<_> = result.accepted().into_iter().map(change_json).collect();
            let review: Vec<_> = result.needs_review().into_iter().map(change_json).collect();
            let errors: Vec<_> = result.errors.iter().map(error_json).collect();

            json!({
                "filePath": result.file_path,
                "success": true,
                "fixed": result.fixed,
                "errors": errors,
                "changes": changes,
                "needsReview": review,
                "fixedCount": result.fixed_count(),
                "confidence": result.confidence,
                "isValid": result.is_valid,
                "iterations": result.iterations
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}

/// Format validation reports as JSON.
pub fn format_reports(reports: &[ValidationReport]) -> String {
    let output: Vec<serde_json::Value> = reports
        .iter()
        .map(|report| {
            let errors: Vec<_> = report.errors.iter().map(error_json).collect();
            json!({
                "filePath": report.file_path,
                "valid": report.valid,
                "errors": errors,
                "errorCount": report.error_count(),
                "warningCount": report.warning_count()
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::yamlfix::config::{FixOptions, ValidateOptions};
    use crate::analyzer::yamlfix::fixer::{fix_with_path, validate_with_path};

    #[test]
    fn test_json_fix_format() {
        let result =
            fix_with_path("apiVersion v1\nkind: Pod\n", "pod.yaml", &FixOptions::default());
        let output = format_fixes(&[result]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 1);

        let file = &arr[0];
        assert_eq!(file["filePath"], "pod.yaml");
        assert_eq!(file["fixed"], "apiVersion: v1\nkind: Pod\n");
        assert_eq!(file["isValid"], true);
        assert_eq!(file["fixedCount"], 1);

        let changes = file["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["category"], "missing-colon");
        assert_eq!(changes[0]["severity"], "critical");
        assert_eq!(changes[0]["line"], 1);
    }

    #[test]
    fn test_json_report_format() {
        let report =
            validate_with_path("kind: Pod\nkind: Pod\n", "dup.yaml", &ValidateOptions::default());
        let output = format_reports(&[report]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let file = &parsed.as_array().unwrap()[0];
        assert_eq!(file["filePath"], "dup.yaml");
        assert_eq!(file["valid"], false);

        let errors = file["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["code"], "DUPLICATE_KEY");
        assert_eq!(errors[0]["line"], 2);
        assert!(errors[0]["column"].is_null());
    }

    #[test]
    fn test_json_format_empty() {
        assert_eq!(format_fixes(&[]), "[]");
    }
}
