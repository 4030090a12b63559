use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{CampaignInput, GenerationError};
use crate::ports::StrategyEndpoint;

#[derive(Clone)]
enum Behavior {
    Reply(String),
    Fail(GenerationError),
    Pending,
}

/// Scripted endpoint recording every brief it receives.
#[derive(Clone)]
pub struct FakeEndpoint {
    behavior: Arc<Mutex<Behavior>>,
    pub received: Arc<Mutex<Vec<CampaignInput>>>,
}

impl FakeEndpoint {
    fn with(behavior: Behavior) -> Self {
        Self { behavior: Arc::new(Mutex::new(behavior)), received: Arc::new(Mutex::new(vec![])) }
    }

    pub fn replying(body: impl Into<String>) -> Self {
        Self::with(Behavior::Reply(body.into()))
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::with(Behavior::Fail(error))
    }

    /// Never resolves; only cancellation ends the call.
    pub fn pending() -> Self {
        Self::with(Behavior::Pending)
    }

    pub fn reply_with(&self, body: impl Into<String>) {
        *self.behavior.lock().unwrap() = Behavior::Reply(body.into());
    }

    pub fn fail_with(&self, error: GenerationError) {
        *self.behavior.lock().unwrap() = Behavior::Fail(error);
    }

    pub fn hang(&self) {
        *self.behavior.lock().unwrap() = Behavior::Pending;
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl StrategyEndpoint for FakeEndpoint {
    async fn request(&self, input: &CampaignInput) -> Result<String, GenerationError> {
        self.received.lock().unwrap().push(input.clone());
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Reply(body) => Ok(body),
            Behavior::Fail(error) => Err(error),
            Behavior::Pending => std::future::pending().await,
        }
    }
}
