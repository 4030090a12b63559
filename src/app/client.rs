//! Generation Client: one validated round trip to the endpoint, then parsing.

use tokio_util::sync::CancellationToken;

use crate::domain::response::{self, ParseOutcome};
use crate::domain::{CampaignInput, GenerationError, StrategyDocument};
use crate::ports::StrategyEndpoint;

/// Document produced by a successful round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub document: StrategyDocument,
    pub outcome: ParseOutcome,
}

/// Sends briefs to a [`StrategyEndpoint`] and turns replies into documents.
///
/// No retries and no internal timeout; the caller owns cancellation.
pub struct GenerationClient<E: StrategyEndpoint> {
    endpoint: E,
}

impl<E: StrategyEndpoint> GenerationClient<E> {
    pub fn new(endpoint: E) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Generate a strategy document for `input`.
    pub async fn generate(
        &self,
        input: &CampaignInput,
        cancel: &CancellationToken,
    ) -> Result<StrategyDocument, GenerationError> {
        self.generate_detailed(input, cancel).await.map(|generated| generated.document)
    }

    /// Like [`generate`](Self::generate), also reporting whether the parser fell back.
    pub async fn generate_detailed(
        &self,
        input: &CampaignInput,
        cancel: &CancellationToken,
    ) -> Result<Generated, GenerationError> {
        input.validate()?;
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        tracing::info!(
            business_type = %input.business_type,
            goal = input.goal.as_str(),
            competitor_urls = input.competitor_urls().len(),
            "requesting strategy"
        );
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("strategy request cancelled");
                return Err(GenerationError::Cancelled);
            }
            result = self.endpoint.request(input) => result?,
        };

        let (mut document, outcome) = response::parse_with_outcome(&body, input);
        if input.has_competitor_urls() {
            document.set_competitor_analysis_flag(true);
        }
        Ok(Generated { document, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SectionKey;
    use crate::testing::{FakeEndpoint, sample_input};
    use serde_json::json;

    #[tokio::test]
    async fn fenced_reply_is_parsed() {
        let endpoint = FakeEndpoint::replying("```json\n{\"overview\":\"<p>ok</p>\"}\n```");
        let client = GenerationClient::new(endpoint.clone());
        let document = client.generate(&sample_input(), &CancellationToken::new()).await.unwrap();
        assert_eq!(document.into_value(), json!({"overview": "<p>ok</p>"}));
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_brief_never_reaches_endpoint() {
        let endpoint = FakeEndpoint::replying("{}");
        let client = GenerationClient::new(endpoint.clone());
        let mut input = sample_input();
        input.persona.clear();
        let err = client.generate(&input, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn endpoint_errors_propagate() {
        let endpoint =
            FakeEndpoint::failing(GenerationError::QuotaExceeded { message: "quota".into() });
        let client = GenerationClient::new(endpoint);
        let err = client.generate(&sample_input(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn parsed_document_gets_competitor_flag_when_urls_present() {
        let endpoint = FakeEndpoint::replying("{\"overview\":\"<p>ok</p>\"}");
        let client = GenerationClient::new(endpoint);
        let mut input = sample_input();
        input.competitor_urls = vec!["https://rival.example.com".into()];
        let generated =
            client.generate_detailed(&input, &CancellationToken::new()).await.unwrap();
        assert_eq!(generated.outcome, ParseOutcome::Parsed);
        assert!(generated.document.has_competitor_analysis());
    }

    #[tokio::test]
    async fn unusable_reply_is_synthesized() {
        let client = GenerationClient::new(FakeEndpoint::replying("not json at all"));
        let generated =
            client.generate_detailed(&sample_input(), &CancellationToken::new()).await.unwrap();
        assert_eq!(generated.outcome, ParseOutcome::Synthesized);
        assert!(generated.document.html_or_empty(SectionKey::Kpi).contains("100 signups"));
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_call() {
        let endpoint = FakeEndpoint::pending();
        let client = GenerationClient::new(endpoint.clone());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let err = client.generate(&sample_input(), &cancel).await.unwrap_err();
        assert_eq!(err, GenerationError::Cancelled);
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_request() {
        let endpoint = FakeEndpoint::replying("{}");
        let client = GenerationClient::new(endpoint.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client.generate(&sample_input(), &cancel).await.unwrap_err();
        assert_eq!(err, GenerationError::Cancelled);
        assert_eq!(endpoint.calls(), 0);
    }
}
