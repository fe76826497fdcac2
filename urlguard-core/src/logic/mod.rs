//! Logic Module - URL Analysis Engines
//!
//! ## Pipeline
//! - `normalize` - scheme defaulting, protocol, domain
//! - `features/` - 20 lexical URL features
//! - `trust/` - trusted-domain bypass
//! - `model/` - classifier adapters and registry
//! - `ensemble/` - plurality vote
//! - `score/` - safety score and explanation
//! - `analyzer` - orchestration

pub mod normalize;
pub mod features;
pub mod trust;
pub mod model;
pub mod ensemble;
pub mod score;
pub mod analyzer;
