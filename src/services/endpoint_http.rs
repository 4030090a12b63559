//! Generation endpoint client using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use crate::domain::{AppError, CampaignInput, ClientConfig, GenerationError};
use crate::ports::StrategyEndpoint;

/// Error `code` the endpoint uses for a missing upstream credential.
pub const CONFIGURATION_CODE: &str = "configuration";

/// `error` text of the endpoint's missing-credential reply.
pub const MISSING_CREDENTIAL_ERROR: &str = "OpenAI APIキーが設定されていません";

/// Credential variable named in the missing-credential `message`.
pub const CREDENTIAL_ENV: &str = "OPENAI_API_KEY";

/// HTTP client for the generation endpoint.
#[derive(Debug, Clone)]
pub struct HttpStrategyEndpoint {
    endpoint_url: Url,
    client: Client,
}

impl HttpStrategyEndpoint {
    /// Create a client for the configured endpoint.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { endpoint_url: config.endpoint_url.clone(), client })
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint_url
    }
}

/// `{error, message, code}` body of a failed endpoint call; `code` is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorBody {
    /// Recognizes the credential-missing reply with or without a `code`.
    fn is_missing_credential(&self) -> bool {
        if let Some(code) = self.code.as_deref() {
            return code == CONFIGURATION_CODE;
        }
        let error = self.error.as_deref().unwrap_or_default();
        let message = self.message.as_deref().unwrap_or_default();
        error.contains("APIキーが設定されていません") || message.contains(CREDENTIAL_ENV)
    }
}

#[async_trait]
impl StrategyEndpoint for HttpStrategyEndpoint {
    async fn request(&self, input: &CampaignInput) -> Result<String, GenerationError> {
        tracing::debug!(url = %self.endpoint_url, "posting campaign brief");
        let response = self
            .client
            .post(self.endpoint_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(input)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            return Ok(body);
        }
        tracing::warn!(status = status.as_u16(), "generation endpoint returned an error");
        Err(classify_failure(status.as_u16(), &body))
    }
}

/// Map a non-2xx endpoint response onto the client error taxonomy.
fn classify_failure(status: u16, body: &str) -> GenerationError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (&parsed.error, &parsed.message) {
        (Some(error), Some(message)) => format!("{}: {}", error, message),
        (Some(text), None) | (None, Some(text)) => text.clone(),
        (None, None) => format!("HTTP {}", status),
    };

    match status {
        429 => GenerationError::QuotaExceeded { message },
        401 => GenerationError::InvalidCredential { message },
        500 if parsed.is_missing_credential() => GenerationError::Configuration { message },
        _ => GenerationError::Transport(format!("Endpoint error ({}): {}", status, message)),
    }
}
