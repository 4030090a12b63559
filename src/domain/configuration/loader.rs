//! Configuration file discovery and parsing.

use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::domain::configuration::Config;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "strategy-maker.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "STRATEGY_MAKER_CONFIG";

/// Environment variable holding the upstream generator credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Load configuration.
///
/// An explicit path (flag or `STRATEGY_MAKER_CONFIG`) must exist. The default
/// file is optional; built-in defaults apply when it is absent.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, AppError> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let (path, required) = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => (path, true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(AppError::config_error(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = parse_config_content(&content)?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Parse configuration from string content.
pub fn parse_config_content(content: &str) -> Result<Config, AppError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Upstream credential from the environment, if set and non-blank.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok().map(|key| key.trim().to_string()).filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::ReportVariant;
    use crate::testing::EnvVarGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn parses_partial_file_with_defaults() {
        let config = parse_config_content(
            r#"
[client]
endpoint_url = "https://strategy.example.com/api/generate"
timeout_secs = 90

[generator]
report = "basic"
"#,
        )
        .unwrap();
        assert_eq!(config.client.endpoint_url.as_str(), "https://strategy.example.com/api/generate");
        assert_eq!(config.client.timeout_secs, Some(90));
        assert_eq!(config.generator.report, ReportVariant::Basic);
        assert_eq!(config.generator.model, "gpt-4o-mini");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = parse_config_content("[client]\nretries = 3\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParseError(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        let err = parse_config_content("[generator]\nmax_tokens = 0\n").unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }

    #[test]
    #[serial]
    fn explicit_missing_file_is_an_error() {
        let _guard = EnvVarGuard::remove(CONFIG_ENV);
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    #[serial]
    fn env_override_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();
        let _guard = EnvVarGuard::set(CONFIG_ENV, &path);
        let config = load_config(None).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }

    #[test]
    #[serial]
    fn blank_api_key_counts_as_missing() {
        let _guard = EnvVarGuard::set(API_KEY_ENV, "  ");
        assert_eq!(api_key_from_env(), None);
        let _guard = EnvVarGuard::set(API_KEY_ENV, "sk-test");
        assert_eq!(api_key_from_env(), Some("sk-test".to_string()));
    }
}
