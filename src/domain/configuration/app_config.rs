//! Application configuration models.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::AppError;
use crate::domain::prompt::ReportVariant;

/// Configuration loaded from `strategy-maker.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the CLI sends briefs.
    #[serde(default)]
    pub client: ClientConfig,
    /// Generation endpoint listener.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream chat-completion settings used by the endpoint.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), AppError> {
        self.client.validate()?;
        self.server.validate()?;
        self.generator.validate()?;
        Ok(())
    }
}

/// Generation client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Full URL of the generation endpoint.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: Url,
    /// Optional request timeout; no timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { endpoint_url: default_endpoint_url(), timeout_secs: None }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !matches!(self.endpoint_url.scheme(), "http" | "https") {
            return Err(AppError::InvalidConfig(format!(
                "client.endpoint_url must be http(s): {}",
                self.endpoint_url
            )));
        }
        validate_timeout("client.timeout_secs", self.timeout_secs)
    }
}

/// Generation endpoint listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Route serving the generation endpoint.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), path: default_path() }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.socket_addr()?;
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(AppError::InvalidConfig(format!(
                "server.path must be an absolute route like /api/generate (got '{}')",
                self.path
            )));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.bind.parse().map_err(|err| {
            AppError::InvalidConfig(format!("server.bind '{}' is not a socket address: {}", self.bind, err))
        })
    }
}

/// Upstream chat-completion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: Url,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Optional upstream timeout; no timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Which sections the endpoint asks for.
    #[serde(default)]
    pub report: ReportVariant,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: None,
            report: ReportVariant::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.model.trim().is_empty() {
            return Err(AppError::InvalidConfig("generator.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::InvalidConfig(
                "generator.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(AppError::InvalidConfig(
                "generator.max_tokens must be greater than 0".to_string(),
            ));
        }
        validate_timeout("generator.timeout_secs", self.timeout_secs)
    }

    /// `{api_base}/chat/completions`.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.as_str().trim_end_matches('/'))
    }
}

fn validate_timeout(field: &str, timeout: Option<u64>) -> Result<(), AppError> {
    if timeout == Some(0) {
        return Err(AppError::InvalidConfig(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

fn default_endpoint_url() -> Url {
    Url::parse("http://127.0.0.1:3000/api/generate").expect("Default endpoint URL must be valid")
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_path() -> String {
    "/api/generate".to_string()
}

fn default_api_base() -> Url {
    Url::parse("https://api.openai.com/v1").expect("Default API base must be valid")
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}
