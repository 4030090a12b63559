use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{CompletionBackend, UpstreamError};

/// Scripted upstream generator recording every prompt it receives.
#[derive(Clone)]
pub struct FakeBackend {
    reply: Result<String, UpstreamError>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { reply: Ok(reply.into()), prompts: Arc::new(Mutex::new(vec![])) }
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self { reply: Err(error), prompts: Arc::new(Mutex::new(vec![])) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}
