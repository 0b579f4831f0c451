use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{
    errors::GenerationError,
    payload::{parse_generated_work, GeneratedWork},
};

/// Opaque text generator: prompt in, `{title, content}` out
#[async_trait]
pub trait WorkGenerator: Send + Sync {
    async fn generate_work(&self, prompt: &str) -> Result<GeneratedWork, GenerationError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// WorkGenerator over an OpenAI-compatible chat-completions endpoint
pub struct HttpWorkGenerator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl HttpWorkGenerator {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| GenerationError::MalformedPayload(format!("invalid api key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl WorkGenerator for HttpWorkGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_work(&self, prompt: &str) -> Result<GeneratedWork, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            warn!(status, "Generation API returned an error");
            return Err(GenerationError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(raw_len = content.len(), "Generation response received");
        parse_generated_work(&content)
    }
}
