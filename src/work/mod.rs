// Public API - what other modules can use
pub use handlers::{react_to_work, remove_reaction, submit_work};
pub use models::{Polarity, ReactionChange, ReactionModel, WorkModel};
pub use repository::{InMemoryWorkRepository, PostgresWorkRepository, WorkRepository};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
