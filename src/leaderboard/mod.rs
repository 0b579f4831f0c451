// Public API - what other modules can use
pub use handlers::{get_leaderboard, get_live_leaderboard, update_leaderboard};
pub use models::{AwardModel, PeriodKind, RankedContributor, ScoringWindow};
pub use reconciler::{AwardReconciler, ReconcileOutcome, AWARDED_TOP_N};
pub use repository::{AwardRepository, InMemoryAwardRepository, PostgresAwardRepository};
pub use scorer::Scorer;
pub use scoring::{decay_weight, ScoringStrategy, ScoringVariant};
pub use service::{LeaderboardService, LIVE_TOP_N};

// Internal modules
mod handlers;
pub mod models;
pub mod reconciler;
pub mod repository;
pub mod scorer;
pub mod scoring;
pub mod service;
pub mod types;
