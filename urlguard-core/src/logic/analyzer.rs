//! Scoring Orchestrator
//!
//! `analyze(url)`: normalize → extract → trusted bypass or ensemble vote →
//! safety score. Split into `inspect` and `conclude` so a caller can run the
//! model calls itself (concurrently, with deadlines) between the two.
//!
//! Holds only immutable state; share it behind an `Arc`.

use serde::Serialize;
use thiserror::Error;

use super::ensemble::{self, EnsembleResult, ModelVerdict};
use super::features::{extract_features, ChartPoint, FeatureRecord, FeatureVector};
use super::model::ModelRegistry;
use super::normalize::{host_of, normalize_url, protocol_of, strip_www, Protocol};
use super::score::{self, ScoreRules};
use super::trust::TrustedDomains;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("url is required")]
    EmptyUrl,

    #[error("internal analysis error: {0}")]
    Internal(String),
}

/// Everything known about a URL before any model runs
#[derive(Debug, Clone)]
pub struct UrlContext {
    pub url: String,
    pub domain: String,
    pub protocol: Protocol,
    pub is_trusted: bool,
    pub features: FeatureRecord,
    pub vector: FeatureVector,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub domain: String,
    pub protocol: Protocol,
    pub is_trusted: bool,
    pub features: FeatureRecord,
    pub feature_chart_data: Vec<ChartPoint>,
    pub prediction: EnsembleResult,
    pub safety_score: i64,
    pub explanation: Vec<String>,
}

pub struct Analyzer {
    models: ModelRegistry,
    trusted: TrustedDomains,
    rules: ScoreRules,
}

impl Analyzer {
    pub fn new(models: ModelRegistry, trusted: TrustedDomains) -> Self {
        Self {
            models,
            trusted,
            rules: ScoreRules::default(),
        }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Validate, normalize and extract. Runs no model.
    pub fn inspect(&self, raw: &str) -> Result<UrlContext, AnalyzeError> {
        if raw.trim().is_empty() {
            return Err(AnalyzeError::EmptyUrl);
        }

        let url = normalize_url(raw);
        let host = host_of(&url);
        let domain = strip_www(&host).to_string();
        let protocol = protocol_of(&url);
        let is_trusted = self.trusted.is_trusted(&host);
        let features = extract_features(&url);
        let vector = features.to_vector();

        log::debug!("Inspecting {} (domain={}, trusted={})", url, domain, is_trusted);

        Ok(UrlContext {
            url,
            domain,
            protocol,
            is_trusted,
            features,
            vector,
        })
    }

    /// End-to-end analysis with models called sequentially in load order
    pub fn analyze(&self, raw: &str) -> Result<AnalysisResult, AnalyzeError> {
        let ctx = self.inspect(raw)?;
        if ctx.is_trusted {
            return Ok(self.conclude_trusted(ctx));
        }
        let verdicts = ensemble::collect_verdicts(&ctx.vector, &self.models);
        self.conclude(ctx, verdicts)
    }

    /// Tally settled verdicts (one per loaded model, load order) and score
    pub fn conclude(&self, ctx: UrlContext, verdicts: Vec<ModelVerdict>) -> Result<AnalysisResult, AnalyzeError> {
        if ctx.is_trusted {
            return Ok(self.conclude_trusted(ctx));
        }
        if verdicts.len() != self.models.len() {
            return Err(AnalyzeError::Internal(format!(
                "expected {} model verdicts, got {}",
                self.models.len(),
                verdicts.len()
            )));
        }
        ctx.vector
            .validate()
            .map_err(|e| AnalyzeError::Internal(e.to_string()))?;

        let prediction = ensemble::tally(verdicts, self.models.len());
        if !prediction.confidence_percent.is_finite() {
            return Err(AnalyzeError::Internal("ensemble confidence is not finite".to_string()));
        }

        let assessment = score::assess(&prediction, ctx.protocol, &ctx.domain, &ctx.features, &self.rules);

        log::debug!(
            "Verdict for {}: {} ({}%), score {}",
            ctx.domain,
            prediction.final_label,
            prediction.confidence_percent,
            assessment.score
        );

        Ok(AnalysisResult {
            feature_chart_data: ctx.features.chart_data(),
            url: ctx.url,
            domain: ctx.domain,
            protocol: ctx.protocol,
            is_trusted: false,
            features: ctx.features,
            prediction,
            safety_score: assessment.score,
            explanation: assessment.explanation,
        })
    }

    /// Trusted-domain bypass: no model is called
    pub fn conclude_trusted(&self, ctx: UrlContext) -> AnalysisResult {
        log::debug!("Trusted domain override for {}", ctx.domain);

        let prediction = ensemble::trusted_override(&self.models);
        let assessment = score::assess_trusted(ctx.protocol, &ctx.domain, &self.rules);

        AnalysisResult {
            feature_chart_data: ctx.features.chart_data(),
            url: ctx.url,
            domain: ctx.domain,
            protocol: ctx.protocol,
            is_trusted: true,
            features: ctx.features,
            prediction,
            safety_score: assessment.score,
            explanation: assessment.explanation,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
