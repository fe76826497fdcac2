//! Loaded model listing

use axum::{extract::State, Json};

use crate::models::ModelsResponse;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = state.analyzer.models();
    Json(ModelsResponse {
        models: models.names(),
        count: models.len(),
        details: models.status(),
    })
}
