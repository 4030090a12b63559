//! Generation endpoint: validates a brief, prompts the upstream generator and
//! returns the strategy document as JSON.

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router, middleware};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::content::{self, Block, Inline};
use crate::domain::response;
use crate::domain::{
    AppError, CampaignInput, Config, ReportVariant, SectionKey, StrategyDocument, ValidationError,
    build_prompt,
};
use crate::ports::{CompletionBackend, UpstreamError};
use crate::services::{CONFIGURATION_CODE, CREDENTIAL_ENV, MISSING_CREDENTIAL_ERROR};

/// Characters of an unparseable reply kept in the preview document.
const PREVIEW_CHARS: usize = 500;

/// Shared state of the endpoint handlers.
#[derive(Clone)]
pub struct EndpointState {
    /// `None` when no upstream credential is configured.
    pub backend: Option<Arc<dyn CompletionBackend>>,
    pub variant: ReportVariant,
}

/// JSON error reply `{error, message, code}`.
#[derive(Debug)]
struct EndpointError {
    status: StatusCode,
    error: &'static str,
    message: String,
    code: &'static str,
}

impl EndpointError {
    fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            error: "Method not allowed",
            message: "Only POST is supported".to_string(),
            code: "method_not_allowed",
        }
    }

    fn invalid_request(err: serde_json::Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "リクエストの形式が不正です",
            message: format!("Request body must be a JSON campaign brief: {}", err),
            code: "invalid_request",
        }
    }

    fn validation(err: ValidationError) -> Self {
        let message = match err {
            ValidationError::MissingFields(_) => {
                "事業内容、商品/サービス、目標、目標数値、予算、期間、ターゲット情報は必須です"
                    .to_string()
            }
            other => other.to_string(),
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "必須項目が不足しています",
            message,
            code: "validation",
        }
    }

    fn configuration() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: MISSING_CREDENTIAL_ERROR,
            message: format!("環境変数 {} を設定してください", CREDENTIAL_ENV),
            code: CONFIGURATION_CODE,
        }
    }

    fn generation_failed(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "戦略の生成に失敗しました",
            message,
            code: "generation_failed",
        }
    }
}

impl From<UpstreamError> for EndpointError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InsufficientQuota(_) => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                error: "APIの利用制限に達しました",
                message: "OpenAI APIのクォータを確認してください".to_string(),
                code: "quota_exceeded",
            },
            UpstreamError::InvalidApiKey(_) => Self {
                status: StatusCode::UNAUTHORIZED,
                error: "APIキーが無効です",
                message: "OpenAI APIキーを確認してください".to_string(),
                code: "invalid_credential",
            },
            UpstreamError::Other(message) => Self::generation_failed(message),
        }
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.error, "message": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

/// Build the endpoint router serving `path`.
pub fn router(state: EndpointState, path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(path, post(generate).options(preflight).fallback(method_not_allowed))
        .with_state(state)
        .layer(cors)
        .layer(middleware::map_response(with_cors_headers))
}

async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed(method: Method) -> EndpointError {
    tracing::warn!(%method, "rejected request method");
    EndpointError::method_not_allowed()
}

async fn generate(
    State(state): State<EndpointState>,
    body: Bytes,
) -> Result<Json<Value>, EndpointError> {
    let input: CampaignInput =
        serde_json::from_slice(&body).map_err(EndpointError::invalid_request)?;
    input.validate().map_err(EndpointError::validation)?;

    let Some(backend) = state.backend.as_ref() else {
        tracing::error!("OPENAI_API_KEY is not set");
        return Err(EndpointError::configuration());
    };

    tracing::info!(
        business_type = %input.business_type,
        goal = input.goal.as_str(),
        variant = state.variant.as_str(),
        "generation request received"
    );
    let prompt = build_prompt(&input, state.variant)
        .map_err(|err| EndpointError::generation_failed(err.to_string()))?;

    let reply = backend.complete(&prompt).await.map_err(|err| {
        tracing::error!(error = %err, "upstream generation failed");
        EndpointError::from(err)
    })?;

    let document = match response::try_parse(&reply) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(error = %err, reply_chars = reply.chars().count(), "upstream reply is not a JSON object; returning preview");
            preview_document(&reply)
        }
    };
    Ok(Json(document.into_value()))
}

/// Document returned when the upstream reply could not be parsed.
pub fn preview_document(reply: &str) -> StrategyDocument {
    let head: String = reply.chars().take(PREVIEW_CHARS).collect();
    let overview = content::to_html(&[
        Block::Heading(vec![Inline::Text("戦略概要".to_string())]),
        Block::Paragraph(vec![Inline::Text(format!("{}...", head))]),
    ]);

    let mut document = StrategyDocument::new();
    document.set_html(SectionKey::Overview, overview.trim_end());
    document.set_html(SectionKey::Kpi, "<p>パース エラーが発生しました</p>");
    for key in SectionKey::FIXED.into_iter().skip(2) {
        document.set_html(key, "");
    }
    document
}

/// Serve the endpoint until ctrl-c.
pub async fn serve(config: &Config, backend: Option<Arc<dyn CompletionBackend>>) -> Result<(), AppError> {
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    if backend.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; generation requests will fail with 500");
    }
    let state = EndpointState { backend, variant: config.generator.report };
    let app = router(state, &config.server.path);
    tracing::info!(%addr, path = %config.server.path, "generation endpoint listening");

    serve_on(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve_on(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}
