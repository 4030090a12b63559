pub mod app_config;
pub mod loader;

pub use app_config::{ClientConfig, Config, GeneratorConfig, ServerConfig};
pub use loader::{API_KEY_ENV, CONFIG_ENV, CONFIG_FILE, api_key_from_env, load_config, parse_config_content};
