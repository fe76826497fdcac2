//! Ensemble Types
//!
//! Data only: per-model verdicts, vote counts and the aggregated result.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::logic::model::{Label, ModelError, Prediction};

// ============================================================================
// MODEL VERDICT
// ============================================================================

/// One model's outcome for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVerdict {
    pub model_name: String,
    pub predicted_label: Label,
    /// `null` when the model reports no probability
    pub confidence_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelVerdict {
    pub fn from_prediction(model_name: impl Into<String>, prediction: Prediction) -> Self {
        Self {
            model_name: model_name.into(),
            predicted_label: prediction.label,
            confidence_percent: prediction.confidence_percent,
            error: None,
        }
    }

    pub fn failed(model_name: impl Into<String>, error: &ModelError) -> Self {
        Self {
            model_name: model_name.into(),
            predicted_label: Label::Error,
            confidence_percent: None,
            error: Some(error.to_string()),
        }
    }

    /// Counts toward the tally
    pub fn is_vote(&self) -> bool {
        self.error.is_none() && self.predicted_label.is_votable()
    }
}

// ============================================================================
// VOTE COUNTS
// ============================================================================

/// Label → votes, ordered by first appearance. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteCounts(Vec<(Label, usize)>);

impl VoteCounts {
    pub fn increment(&mut self, label: Label) {
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label, 1)),
        }
    }

    pub fn set(&mut self, label: Label, count: usize) {
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c = count,
            None => self.0.push((label, count)),
        }
    }

    pub fn get(&self, label: Label) -> usize {
        self.0.iter().find(|(l, _)| *l == label).map(|(_, c)| *c).unwrap_or(0)
    }

    pub fn max(&self) -> usize {
        self.0.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.0.iter().copied()
    }

    /// "benign: 2, phishing: 1"
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Serialize for VoteCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label.as_str(), count)?;
        }
        map.end()
    }
}

// ============================================================================
// ENSEMBLE RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleResult {
    pub final_label: Label,
    pub display_label: &'static str,
    /// Share of usable votes won by `final_label`, one decimal
    pub confidence_percent: f64,
    pub vote_counts: VoteCounts,
    /// One entry per loaded model, in load order
    pub per_model: Vec<ModelVerdict>,
    pub total_models: usize,
    pub voting_models: usize,
    /// Set when the trusted-domain bypass produced this result
    pub trusted_domain_override: bool,
}

impl EnsembleResult {
    /// No usable vote
    pub fn unknown(per_model: Vec<ModelVerdict>, total_models: usize) -> Self {
        Self {
            final_label: Label::Unknown,
            display_label: Label::Unknown.display_name(),
            confidence_percent: 0.0,
            vote_counts: VoteCounts::default(),
            per_model,
            total_models,
            voting_models: 0,
            trusted_domain_override: false,
        }
    }
}
