mod env_guard;
mod fake_backend;
mod fake_endpoint;
mod fixtures;
mod mock_clipboard;

pub use env_guard::EnvVarGuard;
pub use fake_backend::FakeBackend;
pub use fake_endpoint::FakeEndpoint;
pub use fixtures::sample_input;
pub use mock_clipboard::MockClipboard;
