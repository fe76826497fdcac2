//! URL analysis handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use urlguard_core::AnalysisResult;
use validator::Validate;

use crate::inference;
use crate::models::AnalyzeRequest;
use crate::{AppResult, AppState};

/// Analyze one URL
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalysisResult>> {
    let Json(req) = payload?;
    req.validate()?;

    let ctx = state.analyzer.inspect(&req.url)?;
    if ctx.is_trusted {
        return Ok(Json(state.analyzer.conclude_trusted(ctx)));
    }

    let verdicts = inference::run_models(
        state.analyzer.models(),
        &state.stragglers,
        &ctx.vector,
        state.config.model_timeout(),
    )
    .await;
    let result = state.analyzer.conclude(ctx, verdicts)?;

    tracing::debug!(
        domain = %result.domain,
        label = %result.prediction.final_label,
        score = result.safety_score,
        "URL analyzed"
    );

    Ok(Json(result))
}
