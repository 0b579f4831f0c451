// Public API - what other modules can use
pub use client::{HttpWorkGenerator, WorkGenerator};
pub use errors::GenerationError;
pub use payload::{parse_generated_work, strip_code_blocks, GeneratedWork};
pub use prompts::prompt_for;

// Internal modules
mod client;
mod errors;
mod payload;
mod prompts;
