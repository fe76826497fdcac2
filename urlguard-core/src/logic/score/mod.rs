//! Score Module - safety score and explanation
//!
//! - `rules`: base scores, penalties, bounds
//! - `calculator`: score + ordered explanation

pub mod rules;
pub mod calculator;

pub use calculator::{assess, assess_trusted, safety_score, SafetyAssessment};
pub use rules::ScoreRules;
