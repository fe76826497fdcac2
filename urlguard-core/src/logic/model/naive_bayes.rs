//! Gaussian Naive Bayes Adapter
//!
//! Artifact: per-class priors, feature means and feature variances.
//! Joint log-likelihood per class, normalized with log-sum-exp.

use serde::Deserialize;

use super::types::{argmax, confidence_from_probabilities, ClassifierModel, Label, ModelError, Prediction};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Floor added to every variance
pub const DEFAULT_VAR_SMOOTHING: f64 = 1e-9;

#[derive(Debug, Clone, Deserialize)]
pub struct NaiveBayesArtifact {
    pub classes: Vec<i64>,
    pub priors: Vec<f64>,
    pub means: Vec<Vec<f64>>,
    pub variances: Vec<Vec<f64>>,
    #[serde(default = "default_smoothing")]
    pub var_smoothing: f64,
}

fn default_smoothing() -> f64 {
    DEFAULT_VAR_SMOOTHING
}

#[derive(Debug, Clone)]
pub struct NaiveBayesModel {
    classes: Vec<i64>,
    log_priors: Vec<f64>,
    means: Vec<Vec<f64>>,
    variances: Vec<Vec<f64>>,
}

impl NaiveBayesModel {
    pub fn new(artifact: NaiveBayesArtifact) -> Result<Self, String> {
        let n = artifact.classes.len();
        if n == 0 {
            return Err("no classes".to_string());
        }
        if artifact.priors.len() != n || artifact.means.len() != n || artifact.variances.len() != n {
            return Err(format!("expected {} priors, mean rows and variance rows", n));
        }
        if artifact.priors.iter().any(|p| !(*p > 0.0) || !p.is_finite()) {
            return Err("priors must be positive".to_string());
        }
        for row in artifact.means.iter().chain(&artifact.variances) {
            if row.len() != FEATURE_COUNT {
                return Err(format!("row has {} columns, expected {}", row.len(), FEATURE_COUNT));
            }
        }
        if artifact.variances.iter().flatten().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err("variances must be finite and non-negative".to_string());
        }

        let epsilon = artifact.var_smoothing.max(0.0);
        let variances = artifact
            .variances
            .into_iter()
            .map(|row| row.into_iter().map(|v| v + epsilon).collect())
            .collect();

        Ok(Self {
            classes: artifact.classes,
            log_priors: artifact.priors.iter().map(|p| p.ln()).collect(),
            means: artifact.means,
            variances,
        })
    }

    fn joint_log_likelihood(&self, x: &[f32; FEATURE_COUNT]) -> Result<Vec<f64>, ModelError> {
        let mut scores = Vec::with_capacity(self.classes.len());

        for c in 0..self.classes.len() {
            let mut score = self.log_priors[c];
            for j in 0..FEATURE_COUNT {
                let var = self.variances[c][j];
                if var <= 0.0 {
                    return Err(ModelError::InvalidOutput(format!("zero variance at class {} feature {}", c, j)));
                }
                let diff = f64::from(x[j]) - self.means[c][j];
                score -= 0.5 * (2.0 * std::f64::consts::PI * var).ln();
                score -= diff * diff / (2.0 * var);
            }
            scores.push(score);
        }

        Ok(scores)
    }

    pub fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let jll = self.joint_log_likelihood(features.as_array())?;
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(ModelError::InvalidOutput("log-likelihood is not finite".to_string()));
        }
        let log_norm = max + jll.iter().map(|s| (s - max).exp()).sum::<f64>().ln();
        Ok(jll.into_iter().map(|s| (s - log_norm).exp()).collect())
    }
}

impl ClassifierModel for NaiveBayesModel {
    fn technology(&self) -> &'static str {
        "naive_bayes"
    }

    fn predict_label(&self, features: &FeatureVector) -> Result<Label, ModelError> {
        Ok(self.predict(features)?.label)
    }

    fn predict_confidence(&self, features: &FeatureVector) -> Result<Option<f64>, ModelError> {
        Ok(confidence_from_probabilities(&self.probabilities(features)?))
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let probabilities = self.probabilities(features)?;
        let class = argmax(&probabilities)
            .ok_or_else(|| ModelError::InvalidOutput("empty class distribution".to_string()))?;

        Ok(Prediction {
            label: Label::from_code(self.classes[class]),
            confidence_percent: confidence_from_probabilities(&probabilities),
        })
    }
}
