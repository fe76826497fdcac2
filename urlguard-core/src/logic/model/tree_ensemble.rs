//! Tree Ensemble Adapter
//!
//! Evaluates decision-tree ensembles exported to JSON. Two aggregations:
//! - `average`: random-forest style, mean of per-tree class distributions
//! - `softmax`: boosted style, sum of per-tree raw class scores + base score,
//!   then softmax
//!
//! Artifact shape:
//! ```json
//! { "classes": [0, 1, 2, 3], "aggregation": "average",
//!   "trees": [ { "nodes": [
//!       { "feature": 13, "threshold": 75.5, "left": 1, "right": 2 },
//!       { "value": [0.9, 0.0, 0.0, 0.1] },
//!       { "value": [0.1, 0.0, 0.2, 0.7] } ] } ] }
//! ```
//! Split rule: go left when `x[feature] <= threshold`.

use serde::Deserialize;

use super::types::{argmax, confidence_from_probabilities, softmax, ClassifierModel, Label, ModelError, Prediction};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Average,
    Softmax,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsembleArtifact {
    /// Label code for each class column
    pub classes: Vec<i64>,
    #[serde(default)]
    pub aggregation: Aggregation,
    /// Added to the summed scores in `softmax` mode
    #[serde(default)]
    pub base_score: Option<Vec<f64>>,
    pub trees: Vec<Tree>,
}

/// Validated, ready-to-evaluate ensemble
#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    artifact: TreeEnsembleArtifact,
}

impl TreeEnsembleModel {
    /// Check structural invariants once so evaluation cannot index out of range
    pub fn new(artifact: TreeEnsembleArtifact) -> Result<Self, String> {
        let class_count = artifact.classes.len();
        if class_count == 0 {
            return Err("no classes".to_string());
        }
        if artifact.trees.is_empty() {
            return Err("no trees".to_string());
        }
        if let Some(base) = &artifact.base_score {
            if base.len() != class_count {
                return Err(format!("base_score has {} entries, expected {}", base.len(), class_count));
            }
        }

        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {} has no nodes", t));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split { feature, left, right, .. } => {
                        if *feature >= FEATURE_COUNT {
                            return Err(format!("tree {} node {}: feature {} out of range", t, n, feature));
                        }
                        if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                            return Err(format!("tree {} node {}: child out of range", t, n));
                        }
                    }
                    TreeNode::Leaf { value } => {
                        if value.len() != class_count {
                            return Err(format!(
                                "tree {} node {}: leaf has {} values, expected {}",
                                t,
                                n,
                                value.len(),
                                class_count
                            ));
                        }
                    }
                }
            }
        }

        Ok(Self { artifact })
    }

    pub fn class_count(&self) -> usize {
        self.artifact.classes.len()
    }

    /// Walk one tree to its leaf. Bounded by the node count so a cyclic
    /// artifact fails instead of looping.
    fn leaf<'a>(tree: &'a Tree, x: &[f32; FEATURE_COUNT]) -> Result<&'a [f64], ModelError> {
        let mut index = 0;
        for _ in 0..=tree.nodes.len() {
            match &tree.nodes[index] {
                TreeNode::Leaf { value } => return Ok(value),
                TreeNode::Split { feature, threshold, left, right } => {
                    index = if f64::from(x[*feature]) <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ModelError::InvalidOutput("tree walk did not reach a leaf".to_string()))
    }

    /// Class probabilities in `classes` order
    pub fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let x = features.as_array();
        let mut totals = vec![0.0f64; self.class_count()];

        for tree in &self.artifact.trees {
            let value = Self::leaf(tree, x)?;
            match self.artifact.aggregation {
                Aggregation::Average => {
                    let sum: f64 = value.iter().sum();
                    if sum > 0.0 {
                        for (total, v) in totals.iter_mut().zip(value) {
                            *total += v / sum;
                        }
                    }
                }
                Aggregation::Softmax => {
                    for (total, v) in totals.iter_mut().zip(value) {
                        *total += v;
                    }
                }
            }
        }

        match self.artifact.aggregation {
            Aggregation::Average => {
                let trees = self.artifact.trees.len() as f64;
                Ok(totals.into_iter().map(|t| t / trees).collect())
            }
            Aggregation::Softmax => {
                if let Some(base) = &self.artifact.base_score {
                    for (total, b) in totals.iter_mut().zip(base) {
                        *total += b;
                    }
                }
                Ok(softmax(&totals))
            }
        }
    }
}

impl ClassifierModel for TreeEnsembleModel {
    fn technology(&self) -> &'static str {
        "tree_ensemble"
    }

    fn predict_label(&self, features: &FeatureVector) -> Result<Label, ModelError> {
        Ok(self.predict(features)?.label)
    }

    fn predict_confidence(&self, features: &FeatureVector) -> Result<Option<f64>, ModelError> {
        Ok(confidence_from_probabilities(&self.probabilities(features)?))
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let probabilities = self.probabilities(features)?;
        let class = argmax(&probabilities)
            .ok_or_else(|| ModelError::InvalidOutput("empty class distribution".to_string()))?;

        Ok(Prediction {
            label: Label::from_code(self.artifact.classes[class]),
            confidence_percent: confidence_from_probabilities(&probabilities),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::extract_features;

    /// url_length (13) > 75 → phishing, else benign
    fn stump(aggregation: &str) -> TreeEnsembleModel {
        let json = format!(
            r#"{{
                "classes": [0, 1, 2, 3],
                "aggregation": "{}",
                "trees": [
                    {{ "nodes": [
                        {{ "feature": 13, "threshold": 75.0, "left": 1, "right": 2 }},
                        {{ "value": [8.0, 0.0, 0.0, 2.0] }},
                        {{ "value": [1.0, 0.0, 1.0, 8.0] }}
                    ] }},
                    {{ "nodes": [ {{ "value": [1.0, 0.0, 0.0, 1.0] }} ] }}
                ]
            }}"#,
            aggregation
        );
        let artifact: TreeEnsembleArtifact = serde_json::from_str(&json).unwrap();
        TreeEnsembleModel::new(artifact).unwrap()
    }

    #[test]
    fn test_forest_short_url_is_benign() {
        let model = stump("average");
        let features = extract_features("https://example.com/").to_vector();
        let prediction = model.predict(&features).unwrap();

        assert_eq!(prediction.label, Label::Benign);
        // (0.8 + 0.5) / 2
        let confidence = prediction.confidence_percent.unwrap();
        assert!((confidence - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_forest_long_url_is_phishing() {
        let model = stump("average");
        let long = format!("https://example.com/{}", "a".repeat(80));
        let features = extract_features(&long).to_vector();

        assert_eq!(model.predict_label(&features).unwrap(), Label::Phishing);
    }

    #[test]
    fn test_boosted_softmax_confidence_in_range() {
        let model = stump("softmax");
        let features = extract_features("https://example.com/").to_vector();
        let prediction = model.predict(&features).unwrap();

        assert_eq!(prediction.label, Label::Benign);
        let confidence = prediction.confidence_percent.unwrap();
        assert!(confidence > 25.0 && confidence <= 100.0);
    }

    #[test]
    fn test_unknown_class_code_maps_to_unknown() {
        let artifact: TreeEnsembleArtifact = serde_json::from_str(
            r#"{ "classes": [7], "trees": [ { "nodes": [ { "value": [1.0] } ] } ] }"#,
        )
        .unwrap();
        let model = TreeEnsembleModel::new(artifact).unwrap();
        let features = extract_features("https://example.com/").to_vector();

        assert_eq!(model.predict_label(&features).unwrap(), Label::Unknown);
    }

    #[test]
    fn test_rejects_out_of_range_structure() {
        let bad_feature: TreeEnsembleArtifact = serde_json::from_str(
            r#"{ "classes": [0, 3], "trees": [ { "nodes": [
                { "feature": 20, "threshold": 1.0, "left": 1, "right": 1 },
                { "value": [1.0, 0.0] } ] } ] }"#,
        )
        .unwrap();
        assert!(TreeEnsembleModel::new(bad_feature).is_err());

        let bad_leaf: TreeEnsembleArtifact = serde_json::from_str(
            r#"{ "classes": [0, 3], "trees": [ { "nodes": [ { "value": [1.0] } ] } ] }"#,
        )
        .unwrap();
        assert!(TreeEnsembleModel::new(bad_leaf).is_err());
    }

    #[test]
    fn test_cyclic_tree_fails_instead_of_looping() {
        let artifact: TreeEnsembleArtifact = serde_json::from_str(
            r#"{ "classes": [0], "trees": [ { "nodes": [
                { "feature": 0, "threshold": 1.0, "left": 0, "right": 0 } ] } ] }"#,
        )
        .unwrap();
        let model = TreeEnsembleModel::new(artifact).unwrap();
        let features = extract_features("https://example.com/").to_vector();

        assert!(matches!(model.predict(&features), Err(ModelError::InvalidOutput(_))));
    }
}
