//! JSON request/response boundary.
//!
//! Wraps `fix` and `validate` as JSON bodies for an embedding service. No
//! transport lives here: callers hand in a request body and get a response
//! body back. Malformed requests produce `success: false`, never a panic.

use serde::{Deserialize, Serialize};

use crate::analyzer::yamlfix::confidence;
use crate::analyzer::yamlfix::config::{FixOptions, ValidateOptions};
use crate::analyzer::yamlfix::fixer::{self, FixResult, ValidationReport};
use crate::analyzer::yamlfix::types::{Change, Severity, ValidationError};
use crate::error::Result;

/// Body of a fix request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixRequest {
    pub content: String,
    #[serde(default)]
    pub options: FixOptions,
}

/// Body of a validate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub content: String,
    #[serde(default)]
    pub options: ValidateOptions,
}

/// Inline diagnostic for editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub line: usize,
    pub column: Option<usize>,
    pub severity: Severity,
    pub message: String,
    pub code: String,
}

impl From<&ValidationError> for Diagnostic {
    fn from(error: &ValidationError) -> Self {
        Self {
            line: error.line,
            column: error.column,
            severity: error.severity,
            message: error.message.clone(),
            code: error.code.as_str().to_string(),
        }
    }
}

/// Body of a fix response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResponse {
    pub success: bool,
    pub fixed: String,
    pub errors: Vec<ValidationError>,
    /// Changes at or above the confidence threshold.
    pub changes: Vec<Change>,
    /// Changes below the threshold; applied, but flagged for a human.
    pub needs_review: Vec<Change>,
    pub fixed_count: usize,
    pub confidence: f64,
    pub is_valid: bool,
    pub iterations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<FixResult> for FixResponse {
    fn from(result: FixResult) -> Self {
        let fixed_count = result.fixed_count();
        let (changes, needs_review) = confidence::partition(&result.changes, result.threshold);

        Self {
            success: true,
            fixed: result.fixed,
            errors: result.errors,
            changes,
            needs_review,
            fixed_count,
            confidence: result.confidence,
            is_valid: result.is_valid,
            iterations: result.iterations,
            message: None,
        }
    }
}

impl FixResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Body of a validate response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ValidationReport> for ValidateResponse {
    fn from(report: ValidationReport) -> Self {
        let diagnostics = report.errors.iter().map(Diagnostic::from).collect();
        Self {
            success: true,
            valid: report.valid,
            errors: report.errors,
            diagnostics,
            message: None,
        }
    }
}

impl ValidateResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Run a decoded fix request.
pub fn fix_request(request: &FixRequest) -> FixResponse {
    fixer::fix(&request.content, &request.options).into()
}

/// Run a decoded validate request.
pub fn validate_request(request: &ValidateRequest) -> ValidateResponse {
    fixer::validate(&request.content, &request.options).into()
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

fn encode<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        log::error!("Failed to encode response: {}", e);
        r#"{"success":false,"message":"failed to encode response"}"#.to_string()
    })
}

/// Handle a JSON fix request body.
pub fn handle_fix_request(body: &str) -> String {
    let response = match decode::<FixRequest>(body) {
        Ok(request) => fix_request(&request),
        Err(e) => {
            log::warn!("Rejected fix request: {}", e);
            FixResponse::failure(e.to_string())
        }
    };
    encode(&response)
}

/// Handle a JSON validate request body.
pub fn handle_validate_request(body: &str) -> String {
    let response = match decode::<ValidateRequest>(body) {
        Ok(request) => validate_request(&request),
        Err(e) => {
            log::warn!("Rejected validate request: {}", e);
            ValidateResponse::failure(e.to_string())
        }
    };
    encode(&response)
}
