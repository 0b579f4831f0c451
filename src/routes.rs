use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{contributor, leaderboard, pipeline, shared::AppState, work};

/// Builds the HTTP surface over `state`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/leaderboard/live", get(leaderboard::get_live_leaderboard))
        .route("/leaderboard/update", post(leaderboard::update_leaderboard))
        .route("/pipeline/daily", post(pipeline::run_daily_pipeline))
        .route("/pipeline/reactions", post(pipeline::run_reactions))
        .route("/synthetic/stats", get(contributor::synthetic_stats))
        .route("/works", post(work::submit_work))
        .route("/works/:work_id/reactions", post(work::react_to_work))
        .route(
            "/works/:work_id/reactions/:contributor_id",
            delete(work::remove_reaction),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
