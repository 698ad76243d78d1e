//! # Classifier Module
//!
//! Inference-only access to the binary "hit" classifier. Training happens
//! elsewhere; the winning estimator is exported to ONNX (`best_model.onnx`)
//! and evaluated here through ONNX Runtime, whatever its model family.
//!
//! Every implementation consumes feature rows laid out in the order of
//! `feature_columns.json` and yields one [`Prediction`] per row.

mod onnx;

pub use onnx::OnnxClassifier;

use serde::Serialize;

/// Probabilities strictly above this value are classified as hits.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Class decision for a positive-class probability.
///
/// A probability of exactly `0.5` is not a hit, matching a decision
/// function of zero.
pub fn label_for(probability: f64) -> u8 {
    u8::from(probability > DECISION_THRESHOLD)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// `1` for hit, `0` otherwise.
    pub label: u8,
    /// Probability of the hit class.
    pub probability: f64,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            label: label_for(probability),
            probability,
        }
    }
}

/// Anything that scores feature rows for the positive ("hit") class.
pub trait Classifier: Send + Sync {
    /// Short identifier of the backing model, shown by the dashboard.
    fn kind(&self) -> &str;

    /// Scores every row; the output has one entry per input row.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Prediction>, String>;
}
