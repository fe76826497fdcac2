//! Safety Score Rules
//!
//! Constants and the configurable rule set. No scoring logic here.

use crate::logic::model::Label;

// ============================================================================
// BASE SCORES (by final label)
// ============================================================================

pub const BENIGN_BASE: i64 = 90;
pub const DEFACEMENT_BASE: i64 = 60;
pub const PHISHING_BASE: i64 = 35;
pub const MALICIOUS_BASE: i64 = 15;
/// Also used for `error`, which never wins a vote
pub const UNKNOWN_BASE: i64 = 50;

// ============================================================================
// ADJUSTMENTS
// ============================================================================

/// Weight of the complementary mass when confidence is below 100%
pub const BLEND_FACTOR: f64 = 0.3;

/// Subtracted for plain-HTTP URLs
pub const HTTP_PENALTY: i64 = 10;

pub const MIN_SCORE: i64 = 5;
pub const MAX_SCORE: i64 = 95;

/// URLs longer than this get a length warning
pub const LONG_URL_THRESHOLD: i64 = 75;

// ============================================================================
// TRUSTED OVERRIDE
// ============================================================================

pub const TRUSTED_SCORE: i64 = 95;

// ============================================================================
// CONFIGURABLE RULES
// ============================================================================

#[derive(Debug, Clone)]
pub struct ScoreRules {
    pub benign_base: i64,
    pub defacement_base: i64,
    pub phishing_base: i64,
    pub malicious_base: i64,
    pub unknown_base: i64,
    pub blend_factor: f64,
    pub http_penalty: i64,
    pub min_score: i64,
    pub max_score: i64,
    pub long_url_threshold: i64,
    pub trusted_score: i64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            benign_base: BENIGN_BASE,
            defacement_base: DEFACEMENT_BASE,
            phishing_base: PHISHING_BASE,
            malicious_base: MALICIOUS_BASE,
            unknown_base: UNKNOWN_BASE,
            blend_factor: BLEND_FACTOR,
            http_penalty: HTTP_PENALTY,
            min_score: MIN_SCORE,
            max_score: MAX_SCORE,
            long_url_threshold: LONG_URL_THRESHOLD,
            trusted_score: TRUSTED_SCORE,
        }
    }
}

impl ScoreRules {
    pub fn base_score(&self, label: Label) -> i64 {
        match label {
            Label::Benign => self.benign_base,
            Label::Defacement => self.defacement_base,
            Label::Phishing => self.phishing_base,
            Label::Malicious => self.malicious_base,
            Label::Unknown | Label::Error => self.unknown_base,
        }
    }
}
