//! Upstream text generator port used by the generation endpoint.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by the upstream generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Account quota or billing limit exhausted.
    #[error("{0}")]
    InsufficientQuota(String),

    /// The API key was rejected.
    #[error("{0}")]
    InvalidApiKey(String),

    /// Anything else, with a diagnostic message.
    #[error("{0}")]
    Other(String),
}

/// Chat-completion style text generator.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}
