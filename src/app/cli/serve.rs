//! `serve` command: run the generation endpoint.

use std::path::Path;
use std::sync::Arc;

use crate::app::server;
use crate::domain::AppError;
use crate::domain::configuration::{api_key_from_env, load_config};
use crate::ports::CompletionBackend;
use crate::services::OpenAiBackend;

pub fn run_serve(bind: Option<String>, config_path: Option<&Path>) -> Result<i32, AppError> {
    let mut config = load_config(config_path)?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate()?;

    let backend = match api_key_from_env() {
        Some(key) => {
            Some(Arc::new(OpenAiBackend::new(key, &config.generator)?) as Arc<dyn CompletionBackend>)
        }
        None => None,
    };

    let runtime = super::runtime()?;
    runtime.block_on(server::serve(&config, backend))?;
    Ok(0)
}
