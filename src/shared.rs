use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::contributor::{repository::ContributorRepository, service::ContributorService};
use crate::engagement::EngagementSimulator;
use crate::generation::WorkGenerator;
use crate::leaderboard::{repository::AwardRepository, service::LeaderboardService};
use crate::pipeline::PipelineService;
use crate::work::{repository::WorkRepository, service::WorkService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub contributor_repository: Arc<dyn ContributorRepository>,
    pub work_repository: Arc<dyn WorkRepository>,
    pub award_repository: Arc<dyn AwardRepository>,
    pub contributor_service: Arc<ContributorService>,
    pub work_service: Arc<WorkService>,
    pub leaderboard_service: Arc<LeaderboardService>,
    pub pipeline_service: Arc<PipelineService>,
}

impl AppState {
    /// Wires the services on top of the given stores. `generator` is `None`
    /// when no generation credentials are configured.
    pub fn new(
        contributor_repository: Arc<dyn ContributorRepository>,
        work_repository: Arc<dyn WorkRepository>,
        award_repository: Arc<dyn AwardRepository>,
        generator: Option<Arc<dyn WorkGenerator>>,
    ) -> Self {
        let simulator = Arc::new(EngagementSimulator::new(
            Arc::clone(&work_repository),
        ));
        Self::with_simulator(
            contributor_repository,
            work_repository,
            award_repository,
            generator,
            simulator,
        )
    }

    pub fn with_simulator(
        contributor_repository: Arc<dyn ContributorRepository>,
        work_repository: Arc<dyn WorkRepository>,
        award_repository: Arc<dyn AwardRepository>,
        generator: Option<Arc<dyn WorkGenerator>>,
        simulator: Arc<EngagementSimulator>,
    ) -> Self {
        let contributor_service = Arc::new(ContributorService::new(
            Arc::clone(&contributor_repository),
            Arc::clone(&work_repository),
        ));
        let work_service = Arc::new(WorkService::new(
            Arc::clone(&work_repository),
            Arc::clone(&contributor_repository),
        ));
        let leaderboard_service = Arc::new(LeaderboardService::new(
            Arc::clone(&contributor_repository),
            Arc::clone(&work_repository),
            Arc::clone(&award_repository),
        ));
        let pipeline_service = Arc::new(PipelineService::new(
            Arc::clone(&contributor_service),
            Arc::clone(&work_repository),
            simulator,
            Arc::clone(&leaderboard_service),
            generator,
        ));

        Self {
            contributor_repository,
            work_repository,
            award_repository,
            contributor_service,
            work_service,
            leaderboard_service,
            pipeline_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Configuration error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Maps a sqlx failure onto the store error taxonomy: uniqueness violations
/// surface as `Conflict`, everything else as a transient `DatabaseError`.
pub fn database_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return AppError::Conflict(db_error.message().to_string());
        }
    }
    AppError::DatabaseError(error.to_string())
}
