//! Model Registry - ordered set of loaded classifiers
//!
//! Built once at startup from a JSON manifest and never mutated afterwards.
//! Manifest order is load order, and load order is the vote tie-break order.
//!
//! ```json
//! { "models": [
//!     { "name": "Random Forest", "kind": "tree_ensemble", "path": "rf.json",
//!       "sha256": "…", "layoutVersion": 1, "layoutHash": 123456 },
//!     { "name": "XGBoost", "kind": "onnx", "path": "xgb.onnx" },
//!     { "name": "Rules", "kind": "heuristic" } ] }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::heuristic::{HeuristicModel, HeuristicRules};
use super::naive_bayes::{NaiveBayesArtifact, NaiveBayesModel};
use super::onnx::OnnxModel;
use super::tree_ensemble::{TreeEnsembleArtifact, TreeEnsembleModel};
use super::types::ClassifierModel;
use crate::logic::features::layout::{validate_layout, LayoutMismatchError};

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Onnx,
    TreeEnsemble,
    NaiveBayes,
    Heuristic,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Onnx => "onnx",
            ModelKind::TreeEnsemble => "tree_ensemble",
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub kind: ModelKind,
    /// Relative paths resolve against the manifest's directory
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Expected hex SHA-256 of the artifact
    #[serde(default)]
    pub sha256: Option<String>,
    /// Feature layout the artifact was trained on
    #[serde(default)]
    pub layout_version: Option<u8>,
    #[serde(default)]
    pub layout_hash: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelManifest {
    #[serde(default)]
    pub models: Vec<ManifestEntry>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{kind} model requires an artifact path")]
    MissingPath { kind: &'static str },

    #[error("invalid artifact: {0}")]
    Invalid(String),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("runtime error: {0}")]
    Runtime(String),
}

// ============================================================================
// REGISTRY
// ============================================================================

/// A named model ready for inference
#[derive(Clone)]
pub struct LoadedModel {
    pub name: String,
    pub technology: &'static str,
    pub loaded_at: DateTime<Utc>,
    pub model: Arc<dyn ClassifierModel>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("technology", &self.technology)
            .finish()
    }
}

/// Introspection record for one loaded model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub name: String,
    pub technology: &'static str,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<LoadedModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a model. Names are unique; a repeated name is ignored.
    pub fn register(&mut self, name: impl Into<String>, model: Arc<dyn ClassifierModel>) -> bool {
        let name = name.into();
        if self.models.iter().any(|m| m.name == name) {
            log::warn!("Model name {:?} already registered - skipping duplicate", name);
            return false;
        }
        self.models.push(LoadedModel {
            technology: model.technology(),
            name,
            loaded_at: Utc::now(),
            model,
        });
        true
    }

    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>, model: Arc<dyn ClassifierModel>) -> Self {
        self.register(name, model);
        self
    }

    /// Load every model named in the manifest file.
    ///
    /// Never fails: a missing or unreadable manifest gives an empty registry,
    /// and each model that fails to load is logged and skipped.
    pub fn load_manifest(path: &Path) -> Self {
        let manifest = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<ModelManifest>(&bytes) {
                Ok(manifest) => manifest,
                Err(e) => {
                    log::warn!("Model manifest {} is invalid: {} - no models loaded", path.display(), e);
                    return Self::new();
                }
            },
            Err(e) => {
                log::warn!("Model manifest {} not readable: {} - no models loaded", path.display(), e);
                return Self::new();
            }
        };

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_manifest(&manifest, base_dir)
    }

    pub fn from_manifest(manifest: &ModelManifest, base_dir: &Path) -> Self {
        let mut registry = Self::new();

        for entry in &manifest.models {
            match load_entry(entry, base_dir) {
                Ok(model) => {
                    if registry.register(entry.name.clone(), model) {
                        log::info!("✓ Loaded {} ({})", entry.name, entry.kind.as_str());
                    }
                }
                Err(e) => log::warn!("✗ Failed to load {}: {}", entry.name, e),
            }
        }

        log::info!("Loaded {} models: {:?}", registry.len(), registry.names());
        registry
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Models in load order
    pub fn models(&self) -> &[LoadedModel] {
        &self.models
    }

    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        self.models
            .iter()
            .map(|m| ModelStatus {
                name: m.name.clone(),
                technology: m.technology,
                loaded_at: m.loaded_at,
            })
            .collect()
    }
}

// ============================================================================
// LOADING
// ============================================================================

fn load_entry(entry: &ManifestEntry, base_dir: &Path) -> Result<Arc<dyn ClassifierModel>, LoadError> {
    if let (Some(version), Some(hash)) = (entry.layout_version, entry.layout_hash) {
        validate_layout(version, hash)?;
    }

    let artifact = match &entry.path {
        Some(path) => Some(read_artifact(&base_dir.join(path), entry.sha256.as_deref())?),
        None => None,
    };

    let model: Arc<dyn ClassifierModel> = match (entry.kind, artifact) {
        (ModelKind::Heuristic, None) => Arc::new(HeuristicModel::default()),
        (ModelKind::Heuristic, Some((path, bytes))) => {
            let rules: HeuristicRules = parse_json(&path, &bytes)?;
            Arc::new(HeuristicModel::new(rules))
        }
        (ModelKind::TreeEnsemble, Some((path, bytes))) => {
            let artifact: TreeEnsembleArtifact = parse_json(&path, &bytes)?;
            Arc::new(TreeEnsembleModel::new(artifact).map_err(LoadError::Invalid)?)
        }
        (ModelKind::NaiveBayes, Some((path, bytes))) => {
            let artifact: NaiveBayesArtifact = parse_json(&path, &bytes)?;
            Arc::new(NaiveBayesModel::new(artifact).map_err(LoadError::Invalid)?)
        }
        (ModelKind::Onnx, Some((_, bytes))) => {
            Arc::new(OnnxModel::from_bytes(&bytes).map_err(LoadError::Runtime)?)
        }
        (kind, None) => return Err(LoadError::MissingPath { kind: kind.as_str() }),
    };

    Ok(model)
}

/// Read an artifact and verify its checksum when one is declared
fn read_artifact(path: &Path, expected_sha256: Option<&str>) -> Result<(PathBuf, Vec<u8>), LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(expected) = expected_sha256 {
        let actual = hex::encode(Sha256::digest(&bytes));
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(LoadError::Checksum {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok((path.to_path_buf(), bytes))
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// TESTS
// ============================================================================
