//! The HTTP client adapter against the real endpoint router over TCP.

use std::sync::Arc;

use async_trait::async_trait;
use strategy_maker::app::server::serve_on;
use strategy_maker::domain::{ClientConfig, SectionKey};
use strategy_maker::{
    CampaignInput, CompletionBackend, EndpointState, GenerationClient, GenerationError,
    HttpStrategyEndpoint, Provenance, ReportVariant, Session, UpstreamError, router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use url::Url;

struct ScriptedBackend(Result<String, UpstreamError>);

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, UpstreamError> {
        self.0.clone()
    }
}

struct RunningEndpoint {
    url: Url,
    shutdown: oneshot::Sender<()>,
}

async fn start(backend: Option<ScriptedBackend>) -> RunningEndpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let backend = backend.map(|b| Arc::new(b) as Arc<dyn CompletionBackend>);
    let app = router(EndpointState { backend, variant: ReportVariant::Extended }, "/api/generate");
    let (shutdown, rx) = oneshot::channel::<()>();
    tokio::spawn(serve_on(listener, app, async {
        let _ = rx.await;
    }));
    RunningEndpoint { url: Url::parse(&format!("http://{}/api/generate", addr)).unwrap(), shutdown }
}

fn client(endpoint: &RunningEndpoint) -> GenerationClient<HttpStrategyEndpoint> {
    let config = ClientConfig { endpoint_url: endpoint.url.clone(), timeout_secs: Some(10) };
    GenerationClient::new(HttpStrategyEndpoint::new(&config).unwrap())
}

fn brief() -> CampaignInput {
    strategy_maker::domain::samples::sample_brief(0)
}

#[tokio::test]
async fn generated_document_round_trips() {
    let endpoint = start(Some(ScriptedBackend(Ok(
        "```json\n{\"overview\":\"<p>ok</p>\",\"kpi\":\"<p>k</p>\"}\n```".into(),
    ))))
    .await;

    let document = client(&endpoint).generate(&brief(), &CancellationToken::new()).await.unwrap();
    assert_eq!(document.html(SectionKey::Overview), Some("<p>ok</p>"));
    assert_eq!(document.html(SectionKey::Kpi), Some("<p>k</p>"));

    endpoint.shutdown.send(()).unwrap();
}

#[tokio::test]
async fn missing_credential_surfaces_as_configuration_error() {
    let endpoint = start(None).await;

    let err = client(&endpoint).generate(&brief(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, GenerationError::Configuration { .. }), "got {err:?}");

    endpoint.shutdown.send(()).unwrap();
}

#[tokio::test]
async fn upstream_quota_and_key_errors_are_classified() {
    let quota = start(Some(ScriptedBackend(Err(UpstreamError::InsufficientQuota("q".into()))))).await;
    let err = client(&quota).generate(&brief(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, GenerationError::QuotaExceeded { .. }), "got {err:?}");
    quota.shutdown.send(()).unwrap();

    let key = start(Some(ScriptedBackend(Err(UpstreamError::InvalidApiKey("k".into()))))).await;
    let err = client(&key).generate(&brief(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, GenerationError::InvalidCredential { .. }), "got {err:?}");
    key.shutdown.send(()).unwrap();
}

#[tokio::test]
async fn unparseable_upstream_reply_yields_preview() {
    let endpoint = start(Some(ScriptedBackend(Ok("plain prose, no JSON".into())))).await;

    let document = client(&endpoint).generate(&brief(), &CancellationToken::new()).await.unwrap();
    assert!(document.html_or_empty(SectionKey::Overview).contains("plain prose, no JSON..."));
    assert_eq!(document.html(SectionKey::Kpi), Some("<p>パース エラーが発生しました</p>"));

    endpoint.shutdown.send(()).unwrap();
}

#[tokio::test]
async fn session_falls_back_on_endpoint_failure() {
    let endpoint =
        start(Some(ScriptedBackend(Err(UpstreamError::Other("upstream down".into()))))).await;
    let mut session = Session::new(client(&endpoint));

    let report = session.submit(brief(), &CancellationToken::new()).await.unwrap();
    match &report.provenance {
        Provenance::Fallback { reason } => assert!(matches!(reason, GenerationError::Transport(_))),
        other => panic!("expected fallback, got {other:?}"),
    }
    assert!(report.notice().is_some());
    assert!(report.document.html_or_empty(SectionKey::Kpi).contains(&brief().goal_value));

    endpoint.shutdown.send(()).unwrap();
}
