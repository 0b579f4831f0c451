// Public API - what other modules can use
pub use handlers::synthetic_stats;
pub use models::{ContributorModel, SyntheticVariant};
pub use repository::{
    ContributorRepository, InMemoryContributorRepository, PostgresContributorRepository,
};
pub use service::{ContributorService, SyntheticStats};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
