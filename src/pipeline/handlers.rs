use axum::{extract::State, Json};
use chrono::Utc;
use tracing::{info, instrument};

use super::types::{DailyPipelineReport, ReactionsRunReport};
use crate::shared::{AppError, AppState};

/// HTTP handler for the full daily workflow
///
/// POST /pipeline/daily
/// Fails with 500 only when the generator is not configured
#[instrument(name = "run_daily_pipeline", skip(state))]
pub async fn run_daily_pipeline(
    State(state): State<AppState>,
) -> Result<Json<DailyPipelineReport>, AppError> {
    let report = state.pipeline_service.run_daily_pipeline(Utc::now()).await?;
    info!(duration_ms = report.duration_ms, "Daily pipeline served");
    Ok(Json(report))
}

/// POST /pipeline/reactions
#[instrument(name = "run_reactions", skip(state))]
pub async fn run_reactions(
    State(state): State<AppState>,
) -> Result<Json<ReactionsRunReport>, AppError> {
    let report = state.pipeline_service.run_reactions().await?;
    Ok(Json(report))
}
