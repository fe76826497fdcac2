//! Ensemble Module
//!
//! Aggregates per-model predictions into one label by plurality vote.
//!
//! ## Structure
//! - `types`: ModelVerdict, VoteCounts, EnsembleResult
//! - `voter`: collection, tally, trusted override

pub mod types;
pub mod voter;

pub use types::{EnsembleResult, ModelVerdict, VoteCounts};
pub use voter::{collect_verdicts, invoke, tally, trusted_override, vote, TRUSTED_CONFIDENCE};
