use serde::{Deserialize, Serialize};

use super::errors::GenerationError;

/// Title and body produced by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedWork {
    pub title: String,
    pub content: String,
}

/// Strips markdown code fences and surrounding whitespace from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[derive(Deserialize)]
struct RawWork {
    title: Option<String>,
    content: Option<String>,
}

/// Parses the `{"title": ..., "content": ...}` object a generator returns,
/// tolerating code fences around it. Both fields must be non-empty.
pub fn parse_generated_work(raw: &str) -> Result<GeneratedWork, GenerationError> {
    let cleaned = strip_code_blocks(raw);
    let parsed: RawWork = serde_json::from_str(cleaned)
        .map_err(|e| GenerationError::MalformedPayload(e.to_string()))?;

    let title = parsed.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let content = parsed.content.map(|c| c.trim().to_string()).unwrap_or_default();

    if title.is_empty() {
        return Err(GenerationError::MalformedPayload("missing title".to_string()));
    }
    if content.is_empty() {
        return Err(GenerationError::MalformedPayload("missing content".to_string()));
    }

    Ok(GeneratedWork { title, content })
}
