use axum::{extract::State, Json};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::service::SyntheticStats;
use crate::shared::{AppError, AppState};

/// HTTP handler for synthetic contributor statistics
///
/// GET /synthetic/stats
#[instrument(name = "synthetic_stats", skip(state))]
pub async fn synthetic_stats(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, SyntheticStats>>, AppError> {
    let stats = state.contributor_service.synthetic_stats().await?;
    info!(variants = stats.len(), "Synthetic stats served");
    Ok(Json(stats))
}
