use std::io;

use thiserror::Error;

use crate::domain::campaign::ValidationError;

/// Library-wide error type for strategy-maker operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Configuration file exists but holds invalid values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The campaign brief failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generation round trip failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Regeneration was requested before any brief was submitted.
    #[error("No campaign brief has been submitted yet")]
    NoPreviousBrief,

    /// Prompt or report template failed to render.
    #[error("Failed to render template {template}: {reason}")]
    TemplateRender { template: String, reason: String },

    /// Clipboard access failed.
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    /// PDF export failed; the Markdown export is the documented alternative.
    #[error("PDF export failed ({0}). Please use the Markdown export instead.")]
    PdfExport(String),

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// HTTP server failed to start or stopped unexpectedly.
    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn parse_error(what: impl Into<String>, details: impl std::fmt::Display) -> Self {
        AppError::ParseError { what: what.into(), details: details.to_string() }
    }
}

/// Failure kinds of one generation round trip.
///
/// Parse failures never appear here: the response parser resolves them by
/// synthesizing a fallback document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Required brief fields are missing; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The endpoint has no generator credential configured.
    #[error("Generator is not configured: {message}")]
    Configuration { message: String },

    /// The upstream generator quota is exhausted.
    #[error("Generator quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// The endpoint's upstream credential was rejected.
    #[error("Generator credential rejected: {message}")]
    InvalidCredential { message: String },

    /// Network failure or an unexpected response.
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// The caller cancelled the in-flight request.
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether asking again later can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::QuotaExceeded { .. } | GenerationError::Transport(_))
    }

    /// User-facing guidance for the failure.
    pub fn guidance(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "必須項目を入力してください",
            GenerationError::Configuration { .. } => {
                "生成サーバーの設定を確認してください（OPENAI_API_KEY が未設定です）"
            }
            GenerationError::QuotaExceeded { .. } => {
                "APIの利用制限に達しました。しばらく待ってから再生成してください"
            }
            GenerationError::InvalidCredential { .. } => {
                "生成サーバーのAPIキーが無効です。管理者に設定の確認を依頼してください"
            }
            GenerationError::Transport(_) => "戦略の生成に失敗しました。再生成をお試しください",
            GenerationError::Cancelled => "生成をキャンセルしました",
        }
    }
}
