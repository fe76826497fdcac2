//! Heuristic Adapter - rule-based classifier, no trained artifact needed
//!
//! Counts triggered lexical indicators and maps the total to a label.
//! Reports no probability, so its verdicts carry no confidence.

use serde::{Deserialize, Serialize};

use super::types::{ClassifierModel, Label, ModelError};
use crate::logic::features::FeatureVector;

/// Indicator weights and label cut-offs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicRules {
    pub ip_weight: u32,
    pub shortener_weight: u32,
    pub keyword_weight: u32,
    pub at_symbol_weight: u32,
    pub embedded_domain_weight: u32,
    pub abnormal_weight: u32,
    pub long_url_weight: u32,
    pub plain_http_weight: u32,

    pub long_url_threshold: f32,
    pub percent_threshold: f32,
    pub hyphen_threshold: f32,

    /// Score at or above this → phishing
    pub phishing_min: u32,
    /// Score at or above this → malicious
    pub malicious_min: u32,
    /// Deep query-heavy paths on an otherwise clean URL → defacement
    pub defacement_min_params: f32,
    pub defacement_min_dirs: f32,
}

impl Default for HeuristicRules {
    fn default() -> Self {
        Self {
            ip_weight: 3,
            shortener_weight: 2,
            keyword_weight: 2,
            at_symbol_weight: 2,
            embedded_domain_weight: 2,
            abnormal_weight: 1,
            long_url_weight: 1,
            plain_http_weight: 1,

            long_url_threshold: 75.0,
            percent_threshold: 3.0,
            hyphen_threshold: 4.0,

            phishing_min: 3,
            malicious_min: 6,
            defacement_min_params: 3.0,
            defacement_min_dirs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicModel {
    rules: HeuristicRules,
}

impl HeuristicModel {
    pub fn new(rules: HeuristicRules) -> Self {
        Self { rules }
    }

    /// Weighted count of triggered indicators
    pub fn indicator_score(&self, features: &FeatureVector) -> u32 {
        let r = &self.rules;
        let f = |name: &str| features.get_by_name(name).unwrap_or(0.0);

        let mut score = 0;
        if f("use_of_ip") > 0.0 {
            score += r.ip_weight;
        }
        if f("short_url") > 0.0 {
            score += r.shortener_weight;
        }
        if f("sus_url") > 0.0 {
            score += r.keyword_weight;
        }
        if f("count@") > 0.0 {
            score += r.at_symbol_weight;
        }
        if f("count_embed_domian") > 0.0 {
            score += r.embedded_domain_weight;
        }
        if f("abnormal_url") > 0.0 {
            score += r.abnormal_weight;
        }
        if f("url_length") > r.long_url_threshold {
            score += r.long_url_weight;
        }
        if f("count-https") == 0.0 && f("count-http") > 0.0 {
            score += r.plain_http_weight;
        }
        if f("count%") > r.percent_threshold {
            score += 1;
        }
        if f("count-") > r.hyphen_threshold {
            score += 1;
        }
        score
    }
}

impl ClassifierModel for HeuristicModel {
    fn technology(&self) -> &'static str {
        "heuristic"
    }

    fn predict_label(&self, features: &FeatureVector) -> Result<Label, ModelError> {
        let r = &self.rules;
        let score = self.indicator_score(features);

        let label = if score >= r.malicious_min {
            Label::Malicious
        } else if score >= r.phishing_min {
            Label::Phishing
        } else if features.get_by_name("count=").unwrap_or(0.0) >= r.defacement_min_params
            && features.get_by_name("count_dir").unwrap_or(0.0) >= r.defacement_min_dirs
        {
            Label::Defacement
        } else {
            Label::Benign
        };

        Ok(label)
    }
}
