mod clipboard_writer;
mod completion_backend;
mod strategy_endpoint;

pub use clipboard_writer::ClipboardWriter;
pub use completion_backend::{CompletionBackend, UpstreamError};
pub use strategy_endpoint::StrategyEndpoint;
