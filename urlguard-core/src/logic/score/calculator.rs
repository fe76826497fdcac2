//! Safety Score Calculator
//!
//! Input: EnsembleResult + protocol + feature record.
//! Output: bounded score and ordered explanation lines.
//!
//! Explanation order is fixed:
//! 1. protocol
//! 2. trust / ML-analysis statement
//! 3. triggered flags: IP, shortener, keywords, `@`, length
//! 4. vote summary
//! 5. participation

use serde::Serialize;

use super::rules::ScoreRules;
use crate::logic::ensemble::EnsembleResult;
use crate::logic::features::FeatureRecord;
use crate::logic::normalize::Protocol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAssessment {
    pub score: i64,
    pub explanation: Vec<String>,
}

/// Blend base score with ensemble confidence, clamp, apply protocol penalty
pub fn safety_score(ensemble: &EnsembleResult, protocol: Protocol, rules: &ScoreRules) -> i64 {
    let base = rules.base_score(ensemble.final_label);
    let confidence = (ensemble.confidence_percent / 100.0).clamp(0.0, 1.0);

    let blended = base as f64 * confidence
        + (100 - base) as f64 * (1.0 - confidence) * rules.blend_factor;
    let mut score = (blended.trunc() as i64).clamp(rules.min_score, rules.max_score);

    if !protocol.is_secure() {
        score = (score - rules.http_penalty).max(rules.min_score);
    }
    score
}

pub fn assess(
    ensemble: &EnsembleResult,
    protocol: Protocol,
    domain: &str,
    features: &FeatureRecord,
    rules: &ScoreRules,
) -> SafetyAssessment {
    let mut explanation = vec![
        protocol_statement(protocol),
        format!("Domain \"{}\" is not in our trusted list - ML analysis performed.", domain),
    ];

    if features.use_of_ip > 0 {
        explanation.push("⚠ URL uses IP address instead of domain name.".to_string());
    }
    if features.short_url > 0 {
        explanation.push("⚠ URL shortener detected - could hide malicious destination.".to_string());
    }
    if features.sus_url > 0 {
        explanation.push("⚠ Suspicious keywords found (login, bank, account, etc.).".to_string());
    }
    if features.count_at > 0 {
        explanation.push("⚠ @ symbol in URL - potential credential harvesting.".to_string());
    }
    if features.url_length > rules.long_url_threshold {
        explanation.push("⚠ Unusually long URL - often used in phishing.".to_string());
    }

    explanation.push(format!("🗳 Ensemble vote: {}", ensemble.vote_counts.summary()));
    explanation.push(format!(
        "📊 {}/{} models voted.",
        ensemble.voting_models, ensemble.total_models
    ));

    SafetyAssessment {
        score: safety_score(ensemble, protocol, rules),
        explanation,
    }
}

/// Fixed assessment for the trusted-domain bypass
pub fn assess_trusted(protocol: Protocol, domain: &str, rules: &ScoreRules) -> SafetyAssessment {
    SafetyAssessment {
        score: rules.trusted_score,
        explanation: vec![
            protocol_statement(protocol),
            format!("✓ Domain \"{}\" is in our trusted domains list.", domain),
            "✓ Skipped ML analysis - trusted domain.".to_string(),
        ],
    }
}

fn protocol_statement(protocol: Protocol) -> String {
    match protocol {
        Protocol::Https => "✓ Secure HTTPS connection detected.".to_string(),
        Protocol::Http => "⚠ HTTP connection - no encryption.".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ensemble::{EnsembleResult, VoteCounts};
    use crate::logic::features::extract_features;
    use crate::logic::model::Label;

    fn verdict(label: Label, confidence: f64) -> EnsembleResult {
        let mut vote_counts = VoteCounts::default();
        vote_counts.set(label, 3);
        EnsembleResult {
            final_label: label,
            display_label: label.display_name(),
            confidence_percent: confidence,
            vote_counts,
            per_model: Vec::new(),
            total_models: 3,
            voting_models: 3,
            trusted_domain_override: false,
        }
    }

    #[test]
    fn test_malicious_full_confidence_over_http_floors_at_five() {
        let rules = ScoreRules::default();
        assert_eq!(safety_score(&verdict(Label::Malicious, 100.0), Protocol::Http, &rules), 5);
        assert_eq!(safety_score(&verdict(Label::Malicious, 100.0), Protocol::Https, &rules), 15);
    }

    #[test]
    fn test_blending_truncates() {
        let rules = ScoreRules::default();
        // 90 * 0.667 + 10 * 0.333 * 0.3 = 61.03
        assert_eq!(safety_score(&verdict(Label::Benign, 66.7), Protocol::Https, &rules), 61);
        assert_eq!(safety_score(&verdict(Label::Benign, 100.0), Protocol::Https, &rules), 90);
    }

    #[test]
    fn test_unknown_uses_neutral_base() {
        let rules = ScoreRules::default();
        let unknown = EnsembleResult::unknown(Vec::new(), 0);
        // 50 * 0 + 50 * 1 * 0.3 = 15
        assert_eq!(safety_score(&unknown, Protocol::Https, &rules), 15);
        assert_eq!(safety_score(&unknown, Protocol::Http, &rules), 5);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let rules = ScoreRules::default();
        for label in [Label::Benign, Label::Defacement, Label::Phishing, Label::Malicious, Label::Unknown] {
            for confidence in [0.0, 25.0, 50.0, 66.7, 100.0] {
                for protocol in [Protocol::Http, Protocol::Https] {
                    let score = safety_score(&verdict(label, confidence), protocol, &rules);
                    assert!((5..=95).contains(&score), "{} {} {}", label, confidence, score);
                }
            }
        }
    }

    #[test]
    fn test_explanation_order() {
        let url = format!("http://secure-login.example.net/@verify/{}", "a".repeat(60));
        let features = extract_features(&url);
        let assessment = assess(
            &verdict(Label::Phishing, 100.0),
            Protocol::Http,
            "secure-login.example.net",
            &features,
            &ScoreRules::default(),
        );

        assert_eq!(
            assessment.explanation,
            vec![
                "⚠ HTTP connection - no encryption.".to_string(),
                "Domain \"secure-login.example.net\" is not in our trusted list - ML analysis performed.".to_string(),
                "⚠ Suspicious keywords found (login, bank, account, etc.).".to_string(),
                "⚠ @ symbol in URL - potential credential harvesting.".to_string(),
                "⚠ Unusually long URL - often used in phishing.".to_string(),
                "🗳 Ensemble vote: phishing: 3".to_string(),
                "📊 3/3 models voted.".to_string(),
            ]
        );
    }

    #[test]
    fn test_ip_and_shortener_lines_precede_keywords() {
        let features = extract_features("http://192.168.0.1/bit.ly/login");
        let assessment = assess(
            &verdict(Label::Malicious, 100.0),
            Protocol::Http,
            "192.168.0.1",
            &features,
            &ScoreRules::default(),
        );

        assert_eq!(assessment.explanation[2], "⚠ URL uses IP address instead of domain name.");
        assert_eq!(assessment.explanation[3], "⚠ URL shortener detected - could hide malicious destination.");
        assert_eq!(assessment.explanation[4], "⚠ Suspicious keywords found (login, bank, account, etc.).");
    }

    #[test]
    fn test_trusted_assessment() {
        let assessment = assess_trusted(Protocol::Http, "example.com", &ScoreRules::default());
        assert_eq!(assessment.score, 95);
        assert_eq!(
            assessment.explanation,
            vec![
                "⚠ HTTP connection - no encryption.".to_string(),
                "✓ Domain \"example.com\" is in our trusted domains list.".to_string(),
                "✓ Skipped ML analysis - trusted domain.".to_string(),
            ]
        );
    }
}
