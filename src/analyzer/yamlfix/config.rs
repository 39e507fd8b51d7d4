//! Options for the yamlfix engine.
//!
//! - `FixOptions` - everything `fix` accepts (aggressive mode, indent step,
//!   review threshold, iteration cap, confidence bands)
//! - `ValidateOptions` - the subset `validate` needs
//!
//! Unset fields take the documented defaults, both in Rust and when loaded
//! from JSON or TOML.

use serde::{Deserialize, Serialize};

pub const DEFAULT_INDENT_STEP: usize = 2;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_ITERATIONS: usize = 3;
pub const MAX_INDENT_STEP: usize = 8;

/// Confidence assigned to each band by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceBands {
    /// Known-field fixes and closed-vocabulary coercions
    pub high: f64,
    /// Pattern-based structural inference
    pub medium: f64,
    /// Bare pattern matches with no corroborating context
    pub low: f64,
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.8,
            low: 0.6,
        }
    }
}

impl ConfidenceBands {
    fn normalized(self) -> Self {
        Self {
            high: self.high.clamp(0.0, 1.0),
            medium: self.medium.clamp(0.0, 1.0),
            low: self.low.clamp(0.0, 1.0),
        }
    }
}

/// Options accepted by `fix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixOptions {
    /// Allow tree-level structural moves (Phase 3B).
    pub aggressive: bool,
    /// Spaces per nesting level.
    pub indent_step: usize,
    /// Changes scored below this are surfaced as "needs review".
    pub confidence_threshold: f64,
    /// Upper bound on repair passes.
    pub max_iterations: usize,
    pub confidence_bands: ConfidenceBands,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            aggressive: false,
            indent_step: DEFAULT_INDENT_STEP,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            confidence_bands: ConfidenceBands::default(),
        }
    }
}

impl FixOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable structural reorganization.
    pub fn with_aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }

    /// Set the indentation step.
    pub fn with_indent_step(mut self, step: usize) -> Self {
        self.indent_step = step;
        self
    }

    /// Set the review threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the confidence bands.
    pub fn with_bands(mut self, bands: ConfidenceBands) -> Self {
        self.confidence_bands = bands;
        self
    }

    /// Clamp every field into its usable range.
    pub fn normalized(&self) -> Self {
        Self {
            aggressive: self.aggressive,
            indent_step: self.indent_step.clamp(1, MAX_INDENT_STEP),
            confidence_threshold: if self.confidence_threshold.is_nan() {
                DEFAULT_CONFIDENCE_THRESHOLD
            } else {
                self.confidence_threshold.clamp(0.0, 1.0)
            },
            max_iterations: self.max_iterations.max(1),
            confidence_bands: self.confidence_bands.normalized(),
        }
    }

    /// Options for a validation run that mirrors this fix run.
    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            indent_step: self.indent_step,
        }
    }
}

/// Options accepted by `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidateOptions {
    pub indent_step: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            indent_step: DEFAULT_INDENT_STEP,
        }
    }
}

impl ValidateOptions {
    pub fn with_indent_step(mut self, step: usize) -> Self {
        self.indent_step = step;
        self
    }

    pub fn normalized(&self) -> Self {
        Self {
            indent_step: self.indent_step.clamp(1, MAX_INDENT_STEP),
        }
    }
}
