//! Ensemble Voter
//!
//! Input: feature vector + registry. Output: EnsembleResult.
//! Collecting verdicts and tallying them are separate steps so callers can
//! run the model calls however they like (in parallel, with deadlines) and
//! still get the exact same tally.

use std::panic::{catch_unwind, AssertUnwindSafe};

use super::types::{EnsembleResult, ModelVerdict, VoteCounts};
use crate::logic::features::FeatureVector;
use crate::logic::model::{Label, LoadedModel, ModelError, ModelRegistry};

/// Confidence reported for trusted-domain overrides
pub const TRUSTED_CONFIDENCE: f64 = 99.0;

// ============================================================================
// COLLECTION
// ============================================================================

/// Run one model, turning an error or a panic into a failed verdict
pub fn invoke(model: &LoadedModel, features: &FeatureVector) -> ModelVerdict {
    let outcome = catch_unwind(AssertUnwindSafe(|| model.model.predict(features)))
        .unwrap_or_else(|panic| Err(ModelError::Panicked(panic_message(panic.as_ref()))));

    match outcome {
        Ok(prediction) => ModelVerdict::from_prediction(&model.name, prediction),
        Err(e) => {
            log::warn!("Model {} failed: {}", model.name, e);
            ModelVerdict::failed(&model.name, &e)
        }
    }
}

/// Every model's verdict, in load order
pub fn collect_verdicts(features: &FeatureVector, registry: &ModelRegistry) -> Vec<ModelVerdict> {
    registry.models().iter().map(|model| invoke(model, features)).collect()
}

pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// TALLY
// ============================================================================

/// Plurality vote over settled verdicts.
///
/// Ties go to the label that reached the winning count first while walking
/// the verdicts in load order.
pub fn tally(per_model: Vec<ModelVerdict>, total_models: usize) -> EnsembleResult {
    let votes: Vec<Label> = per_model
        .iter()
        .filter(|v| v.is_vote())
        .map(|v| v.predicted_label)
        .collect();

    if votes.is_empty() {
        return EnsembleResult::unknown(per_model, total_models);
    }

    let mut vote_counts = VoteCounts::default();
    for label in &votes {
        vote_counts.increment(*label);
    }
    let winning_count = vote_counts.max();

    let mut running = VoteCounts::default();
    let mut winner = votes[0];
    for label in &votes {
        running.increment(*label);
        if running.get(*label) == winning_count {
            winner = *label;
            break;
        }
    }

    let confidence = round_one_decimal(winning_count as f64 / votes.len() as f64 * 100.0);

    EnsembleResult {
        final_label: winner,
        display_label: winner.display_name(),
        confidence_percent: confidence,
        vote_counts,
        per_model,
        total_models,
        voting_models: votes.len(),
        trusted_domain_override: false,
    }
}

/// Collect from every model, then tally
pub fn vote(features: &FeatureVector, registry: &ModelRegistry) -> EnsembleResult {
    let verdicts = collect_verdicts(features, registry);
    let result = tally(verdicts, registry.len());
    log::debug!(
        "Ensemble: {} ({}%), {}/{} voted",
        result.final_label,
        result.confidence_percent,
        result.voting_models,
        result.total_models
    );
    result
}

/// Stand-in result for a trusted domain: every model recorded as a
/// unanimous benign vote without being called
pub fn trusted_override(registry: &ModelRegistry) -> EnsembleResult {
    let per_model: Vec<ModelVerdict> = registry
        .models()
        .iter()
        .map(|m| ModelVerdict {
            model_name: m.name.clone(),
            predicted_label: Label::Benign,
            confidence_percent: Some(TRUSTED_CONFIDENCE),
            error: None,
        })
        .collect();

    let mut vote_counts = VoteCounts::default();
    if !per_model.is_empty() {
        vote_counts.set(Label::Benign, per_model.len());
    }

    EnsembleResult {
        final_label: Label::Benign,
        display_label: Label::Benign.display_name(),
        confidence_percent: TRUSTED_CONFIDENCE,
        vote_counts,
        total_models: registry.len(),
        voting_models: registry.len(),
        per_model,
        trusted_domain_override: true,
    }
}

/// Half away from zero
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// TESTS
// ============================================================================
