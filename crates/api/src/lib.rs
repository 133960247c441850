mod config;
mod rate_limit;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::FutureExt;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::error;
use vera_agents::CompanionAgent;
use vera_core::{ChatTurnRequest, ChatTurnResponse, TurnOutcome, PROVIDER_FAILURE_REPLY};
use vera_llm::{provider_from_env, CompletionProvider, CompletionSettings};
use vera_observability::{panic_payload, AppMetrics, MetricsSnapshot};

use crate::rate_limit::{RateDecision, SlidingWindowLimiter};

pub use config::ApiConfig;

#[derive(Clone)]
pub struct ApiState {
    agent: Arc<CompanionAgent>,
    metrics: Arc<AppMetrics>,
    limiter: SlidingWindowLimiter,
    allowed_origins: Arc<Vec<String>>,
    body_limit_bytes: usize,
}

impl ApiState {
    pub fn new(agent: CompanionAgent, config: &ApiConfig) -> Self {
        Self {
            metrics: agent.metrics().clone(),
            agent: Arc::new(agent),
            limiter: SlidingWindowLimiter::new(config.rate_limit_window, config.rate_limit_max),
            allowed_origins: Arc::new(config.allowed_origins.clone()),
            body_limit_bytes: config.body_limit_bytes,
        }
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    provider: &'static str,
    model: String,
    metrics: MetricsSnapshot,
}

/// Builds the router from environment configuration.
pub fn build_app(config: &ApiConfig) -> Result<Router> {
    let provider = provider_from_env()?;
    Ok(build_app_with(config, provider, CompletionSettings::from_env()))
}

pub fn build_app_with(
    config: &ApiConfig,
    provider: Arc<dyn CompletionProvider>,
    settings: CompletionSettings,
) -> Router {
    let agent = CompanionAgent::new(provider, settings, AppMetrics::shared());
    build_router(ApiState::new(agent, config))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(state.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        provider: state.agent.provider_name(),
        model: state.agent.settings().model.clone(),
        metrics: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(payload))
}

async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatTurnRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            state.metrics.inc_rejected();
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                rejection.body_text(),
            );
        }
    };

    let agent = state.agent.clone();
    let started = Instant::now();
    let turn = AssertUnwindSafe(async move { agent.process_request(&request).await })
        .catch_unwind()
        .await;

    match turn {
        Ok(Ok(report)) => {
            let status = match report.outcome {
                TurnOutcome::ProviderFailure => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::OK,
            };
            (status, Json(report.response)).into_response()
        }
        Ok(Err(invalid)) => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_message",
            invalid.to_string(),
        ),
        Err(panic) => {
            // The turn was already counted before the panic unwound through it.
            state.metrics.observe_latency(started.elapsed());
            state.metrics.inc_fallback();
            error!(
                panic = %panic_payload(panic.as_ref()),
                at = %chrono::Utc::now().to_rfc3339(),
                "chat turn panicked, returning fallback reply"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatTurnResponse::new(PROVIDER_FAILURE_REPLY)),
            )
                .into_response()
        }
    }
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message.into()
        })),
    )
        .into_response()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if let RateDecision::Limited { retry_after } = state.limiter.check(&ip) {
        let mut response = error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "too many messages from this address, wait and retry",
        );
        if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    response
}
