//! Central Configuration Constants
//!
//! Single source of truth for engine defaults and the environment keys
//! that override them.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "URL Guard";

/// Default model manifest, relative to the working directory
pub const DEFAULT_MODEL_MANIFEST: &str = "models/manifest.json";

/// Default per-model inference deadline (milliseconds)
pub const DEFAULT_MODEL_TIMEOUT_MS: u64 = 2000;

/// Longest URL accepted for analysis (characters)
pub const MAX_URL_LENGTH: usize = 8192;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Model manifest path from `MODEL_MANIFEST` or the default
pub fn get_model_manifest() -> PathBuf {
    std::env::var("MODEL_MANIFEST")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_MANIFEST))
}

/// Extra trusted-domain list from `TRUSTED_DOMAINS_FILE`, if set
pub fn get_trusted_domains_file() -> Option<PathBuf> {
    std::env::var("TRUSTED_DOMAINS_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Per-model deadline from `MODEL_TIMEOUT_MS` or the default
pub fn get_model_timeout_ms() -> u64 {
    std::env::var("MODEL_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_MODEL_TIMEOUT_MS)
}
