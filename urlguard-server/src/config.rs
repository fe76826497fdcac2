//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use urlguard_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Allowed CORS origin; any origin when unset
    pub client_url: Option<String>,

    /// Model manifest; relative artifact paths resolve against its directory
    pub model_manifest: PathBuf,

    /// Extra trusted domains, added to the built-in list
    pub trusted_domains_file: Option<PathBuf>,

    /// Deadline for all model calls of one request
    pub model_timeout_ms: u64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),

            client_url: env::var("CLIENT_URL")
                .ok()
                .filter(|u| !u.trim().is_empty() && u.trim() != "*"),

            model_manifest: constants::get_model_manifest(),

            trusted_domains_file: constants::get_trusted_domains_file(),

            model_timeout_ms: constants::get_model_timeout_ms(),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5001,
            client_url: None,
            model_manifest: PathBuf::from(constants::DEFAULT_MODEL_MANIFEST),
            trusted_domains_file: None,
            model_timeout_ms: constants::DEFAULT_MODEL_TIMEOUT_MS,
            environment: "development".to_string(),
        }
    }
}
