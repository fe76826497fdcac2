//! Model Types
//!
//! Label space, prediction output and the capability trait every
//! classifier adapter implements. No adapter-specific logic here.

use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;

// ============================================================================
// LABELS
// ============================================================================

/// Classification labels.
///
/// Models vote with the first four. `Unknown` marks an output outside the
/// label space, `Error` marks a model that failed; neither is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign,
    Defacement,
    Malicious,
    Phishing,
    Unknown,
    Error,
}

impl Label {
    /// Map a trained label code to a label
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Label::Benign,
            1 => Label::Defacement,
            2 => Label::Malicious,
            3 => Label::Phishing,
            _ => Label::Unknown,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Label::Benign => Some(0),
            Label::Defacement => Some(1),
            Label::Malicious => Some(2),
            Label::Phishing => Some(3),
            Label::Unknown | Label::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Benign => "benign",
            Label::Defacement => "defacement",
            Label::Malicious => "malicious",
            Label::Phishing => "phishing",
            Label::Unknown => "unknown",
            Label::Error => "error",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Benign => "Benign",
            Label::Defacement => "Defacement",
            Label::Malicious => "Malicious",
            Label::Phishing => "Phishing",
            Label::Unknown => "Unknown",
            Label::Error => "Error",
        }
    }

    /// Whether this label takes part in the vote
    pub fn is_votable(&self) -> bool {
        self.code().is_some()
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// One model's answer for one feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Highest class probability in percent, when the model reports one
    pub confidence_percent: Option<f64>,
}

/// Highest probability of a distribution, as a percentage.
/// `None` for empty or non-finite input.
pub fn confidence_from_probabilities(probabilities: &[f64]) -> Option<f64> {
    let max = probabilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        Some((max * 100.0).clamp(0.0, 100.0))
    } else {
        None
    }
}

/// Index of the largest value; the first one wins on ties
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Numerically stable softmax
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        vec![0.0; scores.len()]
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure of one model on one request
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("model panicked: {0}")]
    Panicked(String),

    #[error("inference timed out after {0} ms")]
    TimedOut(u64),

    #[error("skipped: {0} earlier call(s) still running past the deadline")]
    Stalled(usize),
}

// ============================================================================
// CLASSIFIER CAPABILITY
// ============================================================================

/// Uniform capability over every model technology.
///
/// Implementations are loaded once and then only read, so they must be
/// safe to call from several request threads at the same time.
pub trait ClassifierModel: Send + Sync {
    /// Short technology tag ("onnx", "tree_ensemble", ...)
    fn technology(&self) -> &'static str;

    fn predict_label(&self, features: &FeatureVector) -> Result<Label, ModelError>;

    /// Highest class probability in percent. `Ok(None)` when the model
    /// has no probability output.
    fn predict_confidence(&self, _features: &FeatureVector) -> Result<Option<f64>, ModelError> {
        Ok(None)
    }

    /// Label and confidence together. A failing confidence call does not
    /// fail the prediction.
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let label = self.predict_label(features)?;
        let confidence_percent = match self.predict_confidence(features) {
            Ok(confidence) => confidence,
            Err(e) => {
                log::debug!("{} confidence unavailable: {}", self.technology(), e);
                None
            }
        };
        Ok(Prediction { label, confidence_percent })
    }
}
