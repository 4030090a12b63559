//! Generation endpoint port.

use async_trait::async_trait;

use crate::domain::{CampaignInput, GenerationError};

/// One round trip to the generation endpoint.
///
/// Implementations return the raw response body of a successful call; turning
/// it into a document is the parser's job.
#[async_trait]
pub trait StrategyEndpoint: Send + Sync {
    async fn request(&self, input: &CampaignInput) -> Result<String, GenerationError>;
}
