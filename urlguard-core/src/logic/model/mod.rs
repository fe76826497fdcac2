//! Model Module - classifier adapters and the loaded-model registry
//!
//! One adapter per model technology, all behind [`ClassifierModel`], so the
//! ensemble never depends on a specific runtime.

pub mod types;
pub mod tree_ensemble;
pub mod naive_bayes;
pub mod heuristic;
pub mod onnx;
pub mod registry;

// Re-export common types
pub use types::{ClassifierModel, Label, ModelError, Prediction};
pub use tree_ensemble::TreeEnsembleModel;
pub use naive_bayes::NaiveBayesModel;
pub use heuristic::{HeuristicModel, HeuristicRules};
pub use onnx::OnnxModel;
pub use registry::{LoadError, LoadedModel, ModelKind, ModelManifest, ModelRegistry, ModelStatus};
