use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use super::{
    models::PeriodKind,
    types::{LeaderboardQuery, LeaderboardResponse, LeaderboardUpdateReport},
};
use crate::shared::{AppError, AppState};

fn requested_kind(query: &LeaderboardQuery) -> Result<PeriodKind, AppError> {
    match query.kind.as_deref() {
        None => Ok(PeriodKind::Day),
        Some(value) => PeriodKind::parse(value),
    }
}

/// HTTP handler for the persisted leaderboard
///
/// GET /leaderboard?type=day|week|month
/// Serves the last reconciled awards, no recomputation
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let kind = requested_kind(&query)?;
    let entries = state.leaderboard_service.list_awards(kind).await?;

    info!(period = %kind, entries = entries.len(), "Leaderboard served");
    Ok(Json(LeaderboardResponse {
        kind: kind.to_string(),
        entries,
    }))
}

/// GET /leaderboard/live?type=day|week|month
#[instrument(name = "get_live_leaderboard", skip(state))]
pub async fn get_live_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let kind = requested_kind(&query)?;
    let entries = state
        .leaderboard_service
        .windowed_ranking(kind, Utc::now())
        .await?;

    Ok(Json(LeaderboardResponse {
        kind: kind.to_string(),
        entries,
    }))
}

/// HTTP handler for recomputing day, week and month awards
///
/// POST /leaderboard/update
#[instrument(name = "update_leaderboard", skip(state))]
pub async fn update_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardUpdateReport>, AppError> {
    let report = state
        .leaderboard_service
        .update_leaderboards(Utc::now())
        .await;
    Ok(Json(report))
}
