//! Analysis request and introspection response models

use serde::{Deserialize, Serialize};
use urlguard_core::logic::features::{FeatureDescriptor, LayoutInfo};
use urlguard_core::logic::model::ModelStatus;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Missing is treated like empty and rejected by the analyzer.
    /// Length bound matches `constants::MAX_URL_LENGTH`.
    #[serde(default)]
    #[validate(length(max = 8192, message = "url is too long"))]
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub count: usize,
    pub details: Vec<ModelStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesResponse {
    pub layout: LayoutInfo,
    pub features: Vec<FeatureDescriptor>,
    pub chart_features: Vec<&'static str>,
    pub max_url_length: usize,
}
