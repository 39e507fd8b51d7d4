//! Yamlfix: repair engine for malformed Kubernetes-style YAML
//!
//! Takes hand-written or generated manifests that may not parse and returns
//! a corrected document, an auditable list of every change made, and a
//! confidence score for each.
//!
//! # Phases
//!
//! 1. Syntax normalization: line-local rules, runs on anything
//! 2. Parse gate: later phases only run on text that parses
//! 3. Indentation reconstruction: uniform step from a nesting stack
//! 4. Semantic fixes: type coercion and duplicate-key detection
//! 5. Structural reorganization: opt-in (`aggressive`) tree moves
//!
//! Phases 1 to 4 loop until a pass makes no edit or the iteration cap is hit.
//!
//! # Example
//!
//! ```rust,ignore
//! use syncable_yamlfix::analyzer::yamlfix::{FixOptions, fix};
//!
//! let result = fix("apiVersion v1\nkind: Pod\nmetdata:\n  name: web\n", &FixOptions::default());
//! assert_eq!(result.fixed, "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\n");
//!
//! for change in &result.changes {
//!     println!("{}: {} ({:.2})", change.line, change.reason, change.confidence);
//! }
//! ```
//!
//! # Categories
//!
//! | Category         | Severity         | Example                               |
//! |------------------|------------------|---------------------------------------|
//! | indentation      | warning          | tabs, mixed widths                    |
//! | missing-colon    | critical         | `apiVersion v1` -> `apiVersion: v1`   |
//! | colon-spacing    | info             | `image:nginx` -> `image: nginx`       |
//! | list-spacing     | info             | `-name: a` -> `- name: a`             |
//! | key-typo         | warning          | `metdata:` -> `metadata:`             |
//! | quote-balance    | critical         | `image: "nginx` -> `image: "nginx"`   |
//! | numeric-coercion | warning / info   | `replicas: three` -> `replicas: 3`    |
//! | boolean-coercion | warning / info   | `privileged: yes` -> `privileged: true` |
//! | duplicate-key    | error            | reported, never removed               |
//! | structural-move  | warning          | root `name` -> `metadata.name`        |

pub mod classifier;
pub mod confidence;
pub mod config;
pub mod fixer;
pub mod formatter;
pub mod indent;
pub mod knowledge;
pub mod normalizer;
pub mod parse_gate;
pub mod reorganize;
pub mod semantic;
pub mod service;
pub mod types;

// Re-export main types and functions
pub use config::{ConfidenceBands, FixOptions, ValidateOptions};
pub use fixer::{
    FixResult, PassTimings, ValidationReport, fix, fix_with_path, validate, validate_with_path,
};
pub use formatter::{OutputFormat, format_fix_results, format_validation_reports};
pub use service::{
    FixRequest, FixResponse, ValidateRequest, ValidateResponse, handle_fix_request,
    handle_validate_request,
};
pub use types::{Change, ErrorCode, Evidence, FixCategory, Phase, Severity, ValidationError};
