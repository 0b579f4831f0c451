// Public API - what other modules can use
pub use handlers::{run_daily_pipeline, run_reactions};
pub use scheduler::{spawn_scheduler, SchedulerConfig};
pub use service::PipelineService;

// Internal modules
mod handlers;
pub mod scheduler;
pub mod service;
pub mod types;
