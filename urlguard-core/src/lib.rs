//! URL Guard core engine
//!
//! Deterministic lexical feature extraction plus an ensemble vote across
//! independently trained classifiers, producing a verdict, a bounded
//! safety score and an ordered explanation for a URL.

pub mod constants;
pub mod logic;

pub use logic::analyzer::{AnalysisResult, AnalyzeError, Analyzer, UrlContext};
pub use logic::ensemble::{EnsembleResult, ModelVerdict, VoteCounts};
pub use logic::features::{extract_features, FeatureRecord, FeatureVector, LayoutInfo};
pub use logic::model::{ClassifierModel, Label, ModelError, ModelRegistry};
pub use logic::normalize::Protocol;
pub use logic::score::ScoreRules;
pub use logic::trust::TrustedDomains;
