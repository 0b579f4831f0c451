pub mod actions;
pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::Response;
pub use builders::WorkBuilder;
#[allow(unused_imports)]
pub use mocks::{FailingWorkRepository, ScriptedGenerator};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
