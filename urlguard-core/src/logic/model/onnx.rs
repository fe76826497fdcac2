//! ONNX Adapter - ONNX Runtime Integration
//!
//! Expects a classifier exported with a float input `[1, FEATURE_COUNT]`.
//! Output 0 is the class: an int64 label code, or a float score row that
//! is arg-maxed. An optional float output 1 holds class probabilities.

use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::types::{argmax, confidence_from_probabilities, ClassifierModel, Label, ModelError, Prediction};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

pub struct OnnxModel {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    label_output: String,
    probability_output: Option<String>,
}

impl OnnxModel {
    /// Build a session from model bytes (already checksum-verified by the loader)
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, String> {
        log::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| format!("Session builder error: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Optimization error: {}", e))?
            .commit_from_memory(model_bytes)
            .map_err(|e| format!("Load from memory error: {}", e))?;

        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let label_output = outputs
            .first()
            .cloned()
            .ok_or_else(|| "No output defined".to_string())?;

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            probability_output: outputs.get(1).cloned(),
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.as_slice().to_vec())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let label_value = outputs
            .get(&self.label_output)
            .ok_or_else(|| ModelError::InvalidOutput(format!("missing output {}", self.label_output)))?;

        let label = if let Ok((_, codes)) = label_value.try_extract_tensor::<i64>() {
            let code = codes
                .first()
                .copied()
                .ok_or_else(|| ModelError::InvalidOutput("empty label tensor".to_string()))?;
            Label::from_code(code)
        } else {
            let (_, scores) = label_value
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::InvalidOutput(format!("Extract error: {}", e)))?;
            let scores: Vec<f64> = scores.iter().map(|s| f64::from(*s)).collect();
            let class = argmax(&scores)
                .ok_or_else(|| ModelError::InvalidOutput("empty score tensor".to_string()))?;
            Label::from_code(class as i64)
        };

        // Probability output is optional; anything unreadable means "not reported"
        let confidence_percent = self
            .probability_output
            .as_ref()
            .and_then(|name| outputs.get(name))
            .and_then(|value| value.try_extract_tensor::<f32>().ok())
            .and_then(|(_, probabilities)| {
                let probabilities: Vec<f64> = probabilities.iter().map(|p| f64::from(*p)).collect();
                confidence_from_probabilities(&probabilities)
            });

        Ok(Prediction { label, confidence_percent })
    }
}

impl ClassifierModel for OnnxModel {
    fn technology(&self) -> &'static str {
        "onnx"
    }

    fn predict_label(&self, features: &FeatureVector) -> Result<Label, ModelError> {
        Ok(self.run(features)?.label)
    }

    fn predict_confidence(&self, features: &FeatureVector) -> Result<Option<f64>, ModelError> {
        Ok(self.run(features)?.confidence_percent)
    }

    /// One session run for both answers
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        self.run(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        assert!(OnnxModel::from_bytes(b"definitely not an onnx graph").is_err());
    }
}
