//! Feature layout introspection

use axum::Json;
use urlguard_core::constants::MAX_URL_LENGTH;
use urlguard_core::logic::features::{describe_layout, LayoutInfo, CHART_FEATURES};

use crate::models::FeaturesResponse;

pub async fn describe() -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        layout: LayoutInfo::current(),
        features: describe_layout(),
        chart_features: CHART_FEATURES.to_vec(),
        max_url_length: MAX_URL_LENGTH,
    })
}
