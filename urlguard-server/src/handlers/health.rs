//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use urlguard_core::LayoutInfo;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    models_loaded: usize,
    model_names: Vec<String>,
    feature_layout: LayoutInfo,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.analyzer.models();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models_loaded: models.len(),
        model_names: models.names(),
        feature_layout: LayoutInfo::current(),
    })
}
