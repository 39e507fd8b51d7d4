//! Confidence scoring.
//!
//! Maps the evidence behind each change to a score inside the configured
//! bands, aggregates a document score, and partitions changes by a review
//! threshold.

use crate::analyzer::yamlfix::config::ConfidenceBands;
use crate::analyzer::yamlfix::types::{Change, Evidence};

/// Score a single change.
pub fn score(change: &Change, bands: &ConfidenceBands) -> f64 {
    let score = match change.evidence {
        Evidence::Detection => 1.0,
        Evidence::Mechanical | Evidence::KnownField | Evidence::Vocabulary => bands.high,
        Evidence::CaseFold => bands.high - 0.03,
        Evidence::Alias => bands.high - 0.05,
        Evidence::Context => bands.medium + 0.05,
        Evidence::Inference | Evidence::Fuzzy => bands.medium - 0.05,
        Evidence::Pattern => bands.low,
    };
    score.clamp(0.0, 1.0)
}

/// Fill in `confidence` on every change.
pub fn score_all(changes: &mut [Change], bands: &ConfidenceBands) {
    for change in changes.iter_mut() {
        change.confidence = score(change, bands);
    }
}

/// Mean confidence, 1.0 when nothing needed fixing.
pub fn aggregate(changes: &[Change]) -> f64 {
    if changes.is_empty() {
        return 1.0;
    }
    changes.iter().map(|c| c.confidence).sum::<f64>() / changes.len() as f64
}

/// Split changes into (accepted, needs review) without dropping any.
pub fn partition(changes: &[Change], threshold: f64) -> (Vec<Change>, Vec<Change>) {
    changes.iter().cloned().partition(|c| c.confidence >= threshold)
}
