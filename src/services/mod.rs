mod clipboard_arboard;
mod endpoint_http;
mod openai_backend;

pub use clipboard_arboard::ArboardClipboard;
pub use endpoint_http::{
    CONFIGURATION_CODE, CREDENTIAL_ENV, HttpStrategyEndpoint, MISSING_CREDENTIAL_ERROR,
};
pub use openai_backend::OpenAiBackend;
