use thiserror::Error;

/// Failures of the external text generator. Never fatal to a pipeline run.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Generation response had no content")]
    EmptyResponse,

    #[error("Malformed generation payload: {0}")]
    MalformedPayload(String),
}
