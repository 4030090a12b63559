//! OpenAI-compatible chat-completion backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::domain::{AppError, GeneratorConfig};
use crate::ports::{CompletionBackend, UpstreamError};

const INSUFFICIENT_QUOTA: &str = "insufficient_quota";
const INVALID_API_KEY: &str = "invalid_api_key";

/// HTTP client for `POST {api_base}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiBackend {
    api_key: String,
    completions_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("completions_url", &self.completions_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiBackend {
    /// Create a backend with the given API key and configuration.
    pub fn new(api_key: String, config: &GeneratorConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            completions_url: config.completions_url(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::info!(model = %self.model, prompt_chars = prompt.chars().count(), "calling upstream generator");
        let response = self
            .client
            .post(&self.completions_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Other(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Other(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::Other(format!("Failed to parse response: {}", e)))?;
        tracing::info!("upstream generator replied");
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Other("Response contained no message content".into()))
    }
}

fn classify_failure(status: u16, body: &str) -> UpstreamError {
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_default();
    let message = error.message.clone().unwrap_or_else(|| format!("HTTP {}", status));
    let is = |marker: &str| {
        error.code.as_deref() == Some(marker) || error.kind.as_deref() == Some(marker)
    };

    if is(INSUFFICIENT_QUOTA) {
        UpstreamError::InsufficientQuota(message)
    } else if is(INVALID_API_KEY) || status == 401 {
        UpstreamError::InvalidApiKey(message)
    } else {
        UpstreamError::Other(format!("Upstream API error ({}): {}", status, message))
    }
}
