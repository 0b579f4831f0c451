// Library crate for the alfaaz ranking and engagement service
// This file exposes the public API for integration tests

pub mod config;
pub mod contributor;
pub mod engagement;
pub mod generation;
pub mod leaderboard;
pub mod pipeline;
pub mod routes;
pub mod shared;
pub mod work;

// Re-export commonly used types for easier access in tests
pub use contributor::{ContributorModel, ContributorRepository, SyntheticVariant};
pub use engagement::EngagementSimulator;
pub use generation::{GeneratedWork, GenerationError, WorkGenerator};
pub use leaderboard::{AwardRepository, PeriodKind};
pub use routes::build_router;
pub use shared::{AppError, AppState};
pub use work::{WorkModel, WorkRepository};
