//! URL Guard CLI
//!
//! Usage: `url-guard <url>...` prints one AnalysisResult JSON per URL.

use std::process::ExitCode;

use urlguard_core::constants::{self, APP_NAME, APP_VERSION};
use urlguard_core::{Analyzer, ModelRegistry, TrustedDomains};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: url-guard <url>...");
        return ExitCode::from(2);
    }

    log::info!("{} v{}", APP_NAME, APP_VERSION);

    let models = ModelRegistry::load_manifest(&constants::get_model_manifest());
    let trusted = match constants::get_trusted_domains_file() {
        Some(path) => match TrustedDomains::builtin_with_file(&path) {
            Ok(set) => set,
            Err(e) => {
                log::warn!("Trusted domains file {} unreadable: {}", path.display(), e);
                TrustedDomains::builtin()
            }
        },
        None => TrustedDomains::builtin(),
    };
    let analyzer = Analyzer::new(models, trusted);

    let mut failed = false;
    for url in &urls {
        match analyzer.analyze(url) {
            Ok(result) => match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    log::error!("Failed to serialize result for {}: {}", url, e);
                    failed = true;
                }
            },
            Err(e) => {
                eprintln!("{}: {}", url, e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
