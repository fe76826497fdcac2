//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! Every model artifact was trained against this exact column order.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the positional vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "use_of_ip",          // 0: IPv4 / hex IPv4 / full IPv6 literal
    "abnormal_url",       // 1: hostname missing from the raw URL
    "count.",             // 2
    "count-www",          // 3
    "count@",             // 4
    "count_dir",          // 5: '/' in path
    "count_embed_domian", // 6: '//' in path
    "short_url",          // 7: known shortener
    "count-https",        // 8
    "count-http",         // 9: overlaps with count-https
    "count%",             // 10
    "count-",             // 11
    "count=",             // 12
    "url_length",         // 13
    "hostname_length",    // 14: authority, host[:port]
    "sus_url",            // 15: suspicious keyword
    "fd_length",          // 16: first directory
    "tld_length",         // 17: -1 when undeterminable
    "count-digits",       // 18
    "count-letters",      // 19
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 20;

/// Sentinel for a value that cannot be computed
pub const SENTINEL: i64 = -1;

/// Counter features plotted by the dashboard, in display order
pub const CHART_FEATURES: &[&str] = &[
    "count.",
    "count-www",
    "count@",
    "count_dir",
    "count-https",
    "count-http",
    "count%",
    "count-",
    "count=",
    "count-digits",
    "count-letters",
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches between artifacts and the extractor
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout description served by the introspection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when an artifact was trained on a different layout
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that an artifact's declared layout matches the extractor
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// DESCRIPTIONS
// ============================================================================

/// Human-readable description of a feature
pub fn feature_description(name: &str) -> Option<&'static str> {
    let description = match name {
        "use_of_ip" => "Uses IP address instead of domain",
        "abnormal_url" => "Abnormal URL structure",
        "count." => "Number of dots",
        "count-www" => "WWW occurrences",
        "count@" => "@ symbol count (suspicious)",
        "count_dir" => "Directory depth",
        "count_embed_domian" => "Embedded domain indicators",
        "short_url" => "URL shortener detected",
        "count-https" => "HTTPS occurrences",
        "count-http" => "HTTP occurrences",
        "count%" => "Percent encoding count",
        "count-" => "Hyphen count",
        "count=" => "Query parameter indicators",
        "url_length" => "Total URL length",
        "hostname_length" => "Hostname length",
        "sus_url" => "Suspicious keywords detected",
        "fd_length" => "First directory length",
        "tld_length" => "TLD length",
        "count-digits" => "Digit count",
        "count-letters" => "Letter count",
        _ => return None,
    };
    Some(description)
}

/// Short chart label for a counter feature ("count." → "Dots", "count@" → "At")
pub fn chart_label(name: &str) -> String {
    let short = name
        .replace("count", "")
        .replace('-', "")
        .replace('.', "Dots")
        .replace('@', "At")
        .replace('%', "Percent")
        .replace('=', "Equals");

    if short.is_empty() {
        name.to_string()
    } else {
        short
    }
}

/// One described column of the layout
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    pub index: usize,
    pub name: &'static str,
    pub description: &'static str,
}

/// Full layout with descriptions, in column order
pub fn describe_layout() -> Vec<FeatureDescriptor> {
    FEATURE_LAYOUT
        .iter()
        .enumerate()
        .map(|(index, &name)| FeatureDescriptor {
            index,
            name,
            description: feature_description(name).unwrap_or(name),
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
