//! Completion API Server
//!
//! HTTP surface over the completion service: candidate resolution, text and
//! vision completions with fallback, and JSON extraction.

use crate::application::CompletionService;
use crate::domain::entities::{BackendConfig, CallOptions, CallRequest, CallResult, Payload};
use crate::domain::errors::RouterError;
use crate::domain::value_objects::{ProviderKind, Tier};
use crate::infrastructure::ShutdownController;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Query for `GET /api/v1/configs/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
}

/// Body for `POST /api/v1/complete`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
    #[serde(default)]
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(flatten)]
    pub options: RequestOptions,
}

/// Body for `POST /api/v1/vision`.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionRequest {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
    pub prompt: String,
    pub image_data_url: String,
    #[serde(flatten)]
    pub options: RequestOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub json_mode: bool,
    /// Parse the returned text as JSON before responding
    #[serde(default)]
    pub extract_json: bool,
}

impl RequestOptions {
    fn call_options(&self) -> CallOptions {
        CallOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: self.json_mode,
        }
    }
}

/// Body for `POST /api/v1/extract-json`.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct ServedBy {
    pub id: String,
    pub provider: ProviderKind,
    pub model_name: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub text: String,
    pub served_by: ServedBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl From<CallResult> for CompletionResponse {
    fn from(result: CallResult) -> Self {
        Self {
            text: result.text,
            served_by: ServedBy {
                id: result.served_by.id,
                provider: result.served_by.provider,
                model_name: result.served_by.model_name,
            },
            json: None,
        }
    }
}

/// One entry of a resolved candidate list.
#[derive(Debug, Serialize)]
pub struct ResolvedConfig {
    pub id: String,
    pub provider: ProviderKind,
    pub model_name: String,
    pub tier: Tier,
    pub priority: i64,
    pub use_case_tags: Vec<String>,
}

impl From<BackendConfig> for ResolvedConfig {
    fn from(config: BackendConfig) -> Self {
        Self {
            id: config.id,
            provider: config.provider,
            model_name: config.model_name,
            tier: config.tier,
            priority: config.priority,
            use_case_tags: config.use_case_tags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub configs: Vec<ResolvedConfig>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

/// Router errors rendered as HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub RouterError);

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RouterError::ConfigUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RouterError::AllProvidersExhausted { .. } => StatusCode::BAD_GATEWAY,
            RouterError::JsonExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RouterError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let raw = match &self.0 {
            RouterError::JsonExtractionFailed { raw, .. } => Some(raw.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
            raw,
        };
        (status, Json(body)).into_response()
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<CompletionService>,
    pub shutdown: ShutdownController,
}

impl ApiState {
    pub fn new(service: Arc<CompletionService>, shutdown: ShutdownController) -> Self {
        Self { service, shutdown }
    }

    async fn run(&self, request: CallRequest) -> Result<CallResult, RouterError> {
        let _guard = self.shutdown.request_guard();
        let cancel = self.shutdown.request_token();
        self.service.complete_cancellable(&request, &cancel).await
    }
}

/// HTTP server for the completion API.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(
        listen_addr: String,
        service: Arc<CompletionService>,
        shutdown: ShutdownController,
    ) -> Self {
        Self {
            listen_addr,
            state: ApiState::new(service, shutdown),
        }
    }

    /// Run until the shutdown controller fires, then drain.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("completion API listening on {}", self.listen_addr);

        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.stopped().await })
            .await?;

        tracing::info!("completion API stopped");
        Ok(())
    }
}

/// Build the router with request tracing.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/configs/resolve", get(resolve_handler))
        .route("/api/v1/complete", post(complete_handler))
        .route("/api/v1/vision", post(vision_handler))
        .route("/api/v1/extract-json", post(extract_json_handler))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(state)
}

fn parse_tier(tier: Option<&str>) -> Tier {
    tier.map(Tier::from_str).unwrap_or_default()
}

fn respond(
    state: &ApiState,
    result: CallResult,
    extract_json: bool,
) -> Result<Json<CompletionResponse>, ApiError> {
    let json = if extract_json {
        Some(state.service.extract_json(&result.text)?)
    } else {
        None
    };

    let mut response = CompletionResponse::from(result);
    response.json = json;
    Ok(Json(response))
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn resolve_handler(
    State(state): State<ApiState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let tier = parse_tier(query.tier.as_deref());
    let configs = state
        .service
        .resolve_configs(tier, query.use_case.as_deref())
        .await?;

    let total = configs.len();
    Ok(Json(ResolveResponse {
        configs: configs.into_iter().map(ResolvedConfig::from).collect(),
        total,
    }))
}

async fn complete_handler(
    State(state): State<ApiState>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let mut request = CallRequest::new(
        parse_tier(req.tier.as_deref()),
        Payload::text(req.system_prompt, req.user_prompt),
    )
    .options(req.options.call_options());
    request.use_case = req.use_case;

    let result = state.run(request).await?;
    respond(&state, result, req.options.extract_json)
}

async fn vision_handler(
    State(state): State<ApiState>,
    Json(req): Json<VisionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let mut request = CallRequest::new(
        parse_tier(req.tier.as_deref()),
        Payload::vision(req.prompt, req.image_data_url),
    )
    .options(req.options.call_options());
    request.use_case = req.use_case;

    let result = state.run(request).await?;
    respond(&state, result, req.options.extract_json)
}

async fn extract_json_handler(
    State(state): State<ApiState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let value = state.service.extract_json(&req.text)?;
    Ok(Json(ExtractResponse { value }))
}
