//! Generation session: owns the last brief and the last report.

use chrono::{DateTime, Local};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::app::client::GenerationClient;
use crate::domain::response::ParseOutcome;
use crate::domain::{AppError, CampaignInput, GenerationError, StrategyDocument, fallback};
use crate::ports::StrategyEndpoint;

/// Notice shown whenever a report was not produced by the generator.
pub const FALLBACK_NOTICE: &str = "デモモードで表示しています";

/// How the report's document was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Parsed from the generator's reply.
    Generated,
    /// The reply was unusable; synthesized from the brief.
    Synthesized,
    /// The round trip failed; synthesized locally.
    Fallback { reason: GenerationError },
}

impl Provenance {
    /// User-facing notice for non-generated reports.
    pub fn notice(&self) -> Option<String> {
        match self {
            Provenance::Generated => None,
            Provenance::Synthesized => Some(FALLBACK_NOTICE.to_string()),
            Provenance::Fallback { reason } => {
                Some(format!("{}（{}）", FALLBACK_NOTICE, reason.guidance()))
            }
        }
    }
}

/// A document together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub document: StrategyDocument,
    pub provenance: Provenance,
    pub brief: CampaignInput,
    pub generated_at: DateTime<Local>,
}

impl Report {
    pub fn new(document: StrategyDocument, provenance: Provenance, brief: CampaignInput) -> Self {
        Self { document, provenance, brief, generated_at: Local::now() }
    }

    pub fn notice(&self) -> Option<String> {
        self.provenance.notice()
    }
}

/// Progress notifications for a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    Started,
    Completed { provenance: Provenance },
    Cancelled,
    Failed { reason: GenerationError },
}

/// Drives submit/regenerate cycles over a [`GenerationClient`].
///
/// Cycles take `&mut self`, so only one can be in flight at a time. A new
/// report always replaces the previous one wholesale.
pub struct Session<E: StrategyEndpoint> {
    client: GenerationClient<E>,
    last_brief: Option<CampaignInput>,
    report: Option<Report>,
    events: Option<UnboundedSender<GenerationEvent>>,
}

impl<E: StrategyEndpoint> Session<E> {
    pub fn new(client: GenerationClient<E>) -> Self {
        Self { client, last_brief: None, report: None, events: None }
    }

    /// Send lifecycle events to `sender`.
    pub fn with_events(mut self, sender: UnboundedSender<GenerationEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn last_brief(&self) -> Option<&CampaignInput> {
        self.last_brief.as_ref()
    }

    /// Run one generation cycle for `input`.
    ///
    /// Validation errors and cancellation leave the session untouched and are
    /// returned. Every other failure yields a locally synthesized report.
    pub async fn submit(
        &mut self,
        input: CampaignInput,
        cancel: &CancellationToken,
    ) -> Result<&Report, GenerationError> {
        input.validate()?;
        self.last_brief = Some(input.clone());
        self.emit(GenerationEvent::Started);

        let provenance_and_document = match self.client.generate_detailed(&input, cancel).await {
            Ok(generated) => {
                let provenance = match generated.outcome {
                    ParseOutcome::Parsed => Provenance::Generated,
                    ParseOutcome::Synthesized => Provenance::Synthesized,
                };
                (provenance, generated.document)
            }
            Err(GenerationError::Cancelled) => {
                self.emit(GenerationEvent::Cancelled);
                return Err(GenerationError::Cancelled);
            }
            Err(reason) => {
                tracing::warn!(error = %reason, "generation failed; showing synthesized strategy");
                self.emit(GenerationEvent::Failed { reason: reason.clone() });
                (Provenance::Fallback { reason }, fallback::synthesize(&input))
            }
        };

        let (provenance, document) = provenance_and_document;
        self.emit(GenerationEvent::Completed { provenance: provenance.clone() });
        Ok(&*self.report.insert(Report::new(document, provenance, input)))
    }

    /// Rerun the last submitted brief as an independent cycle.
    pub async fn regenerate(&mut self, cancel: &CancellationToken) -> Result<&Report, AppError> {
        let brief = self.last_brief.clone().ok_or(AppError::NoPreviousBrief)?;
        Ok(self.submit(brief, cancel).await?)
    }

    fn emit(&self, event: GenerationEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SectionKey;
    use crate::testing::{FakeEndpoint, sample_input};
    use tokio::sync::mpsc;

    fn session(endpoint: &FakeEndpoint) -> Session<FakeEndpoint> {
        Session::new(GenerationClient::new(endpoint.clone()))
    }

    #[tokio::test]
    async fn successful_submit_stores_generated_report() {
        let endpoint = FakeEndpoint::replying("{\"overview\":\"<p>ok</p>\"}");
        let mut session = session(&endpoint);
        let report = session.submit(sample_input(), &CancellationToken::new()).await.unwrap();
        assert_eq!(report.provenance, Provenance::Generated);
        assert_eq!(report.notice(), None);
        assert_eq!(session.last_brief(), Some(&sample_input()));
    }

    #[tokio::test]
    async fn validation_failure_changes_nothing() {
        let endpoint = FakeEndpoint::replying("{}");
        let mut session = session(&endpoint);
        let mut input = sample_input();
        input.goal_value = " ".into();
        let err = session.submit(input, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Validation(_)));
        assert!(session.report().is_none());
        assert!(session.last_brief().is_none());
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_falls_back_with_notice() {
        let endpoint = FakeEndpoint::failing(GenerationError::Transport("connection refused".into()));
        let mut session = session(&endpoint);
        let report = session.submit(sample_input(), &CancellationToken::new()).await.unwrap();
        assert!(matches!(report.provenance, Provenance::Fallback { .. }));
        assert!(report.notice().unwrap().starts_with(FALLBACK_NOTICE));
        assert!(report.document.html_or_empty(SectionKey::Kpi).contains("100 signups"));
    }

    #[tokio::test]
    async fn unparseable_reply_is_marked_synthesized() {
        let endpoint = FakeEndpoint::replying("not json at all");
        let mut session = session(&endpoint);
        let report = session.submit(sample_input(), &CancellationToken::new()).await.unwrap();
        assert_eq!(report.provenance, Provenance::Synthesized);
        assert_eq!(report.notice().as_deref(), Some(FALLBACK_NOTICE));
    }

    #[tokio::test]
    async fn cancellation_keeps_previous_report() {
        let endpoint = FakeEndpoint::replying("{\"overview\":\"<p>first</p>\"}");
        let mut session = session(&endpoint);
        session.submit(sample_input(), &CancellationToken::new()).await.unwrap();

        endpoint.hang();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut second = sample_input();
        second.business = "Z".into();
        let err = session.submit(second, &cancel).await.unwrap_err();
        assert_eq!(err, GenerationError::Cancelled);
        let kept = session.report().unwrap();
        assert_eq!(kept.document.html(SectionKey::Overview), Some("<p>first</p>"));
    }

    #[tokio::test]
    async fn regenerate_replays_last_brief_and_replaces_report() {
        let endpoint = FakeEndpoint::replying("{\"overview\":\"<p>first</p>\"}");
        let mut session = session(&endpoint);
        session.submit(sample_input(), &CancellationToken::new()).await.unwrap();

        endpoint.reply_with("{\"kpi\":\"<p>second</p>\"}");
        let report = session.regenerate(&CancellationToken::new()).await.unwrap();
        assert!(!report.document.contains(SectionKey::Overview));
        assert_eq!(report.document.html(SectionKey::Kpi), Some("<p>second</p>"));
        assert_eq!(endpoint.calls(), 2);
        assert_eq!(endpoint.received.lock().unwrap()[1], sample_input());
    }

    #[tokio::test]
    async fn regenerate_without_brief_is_an_error() {
        let endpoint = FakeEndpoint::replying("{}");
        let mut session = session(&endpoint);
        let err = session.regenerate(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NoPreviousBrief));
    }

    #[tokio::test]
    async fn events_follow_the_cycle() {
        let endpoint = FakeEndpoint::failing(GenerationError::InvalidCredential { message: "k".into() });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = session(&endpoint).with_events(tx);
        session.submit(sample_input(), &CancellationToken::new()).await.unwrap();

        assert_eq!(rx.recv().await, Some(GenerationEvent::Started));
        assert!(matches!(rx.recv().await, Some(GenerationEvent::Failed { .. })));
        assert!(matches!(
            rx.recv().await,
            Some(GenerationEvent::Completed { provenance: Provenance::Fallback { .. } })
        ));

        endpoint.fail_with(GenerationError::Transport("down".into()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let _ = session.submit(sample_input(), &cancel).await;
        assert_eq!(rx.recv().await, Some(GenerationEvent::Started));
        assert_eq!(rx.recv().await, Some(GenerationEvent::Cancelled));
    }
}
