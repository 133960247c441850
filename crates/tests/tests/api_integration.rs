use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;
use vera_api::{build_app_with, ApiConfig};
use vera_core::{
    trigger_entry, CRISIS_REPLY, EMPTY_COMPLETION_REPLY, IMPLICIT_SCAN_INSTRUCTION,
    PROVIDER_FAILURE_REPLY,
};
use vera_llm::{
    CompletionProvider, CompletionRequest, CompletionSettings, ProviderError, UnconfiguredProvider,
};

const PANIC_DELAY_MILLIS: u64 = 25;

#[derive(Clone, Copy)]
enum Behaviour {
    Echo(&'static str),
    Empty,
    Fail,
    Panic,
}

struct StubProvider {
    behaviour: Behaviour,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.calls.lock().push(request.clone());
        match self.behaviour {
            Behaviour::Echo(text) => Ok(Some(text.to_string())),
            Behaviour::Empty => Ok(None),
            Behaviour::Fail => Err(ProviderError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            }),
            Behaviour::Panic => {
                tokio::time::sleep(Duration::from_millis(PANIC_DELAY_MILLIS)).await;
                panic!("provider exploded")
            }
        }
    }
}

fn app_with(provider: Arc<StubProvider>) -> Router {
    build_app_with(
        &ApiConfig::default(),
        provider,
        CompletionSettings::default(),
    )
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, parsed)
}

#[tokio::test]
async fn health_reports_provider_and_metrics() {
    let app = app_with(StubProvider::new(Behaviour::Echo("hi")));

    let (status, body) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "stub");
    assert_eq!(body["metrics"]["turns_total"], 0);
}

#[tokio::test]
async fn chat_returns_provider_reply_verbatim() {
    let crafted = "That floating feeling is your body dimming the lights. Press your feet down and name three things you can touch.";
    let provider = StubProvider::new(Behaviour::Echo(crafted));
    let app = app_with(provider.clone());

    let (status, body) = send(
        app,
        chat_request(json!({ "message": "I feel like I'm floating outside my body" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": crafted }));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0]
        .system
        .contains(trigger_entry("dpdr").unwrap().response));
    assert_eq!(calls[0].user, "I feel like I'm floating outside my body");
}

#[tokio::test]
async fn crisis_message_bypasses_provider() {
    let provider = StubProvider::new(Behaviour::Echo("unused"));
    let app = app_with(provider.clone());

    let (status, body) = send(
        app,
        chat_request(json!({ "message": "Some days I want to die" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], CRISIS_REPLY);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn unmatched_message_sends_implicit_scan_directive() {
    let provider = StubProvider::new(Behaviour::Echo("ok"));
    let app = app_with(provider.clone());

    let (status, _) = send(
        app,
        chat_request(json!({ "message": "Can you recommend a good book to read?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(provider.calls()[0].system.contains(IMPLICIT_SCAN_INSTRUCTION));
}

#[tokio::test]
async fn invalid_messages_are_client_errors() {
    let provider = StubProvider::new(Behaviour::Echo("unused"));
    let app = app_with(provider.clone());

    for body in [
        json!({}),
        json!({ "message": null }),
        json!({ "message": 123 }),
        json!({ "message": "" }),
        json!({ "message": "   " }),
    ] {
        let (status, parsed) = send(app.clone(), chat_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parsed["error"], "invalid_message");
        assert!(parsed.get("reply").is_none());
    }

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = app_with(StubProvider::new(Behaviour::Echo("unused")));

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, parsed) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "invalid_body");

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .body(Body::from(json!({ "message": "hello" }).to_string()))
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_post_is_method_not_allowed() {
    let app = app_with(StubProvider::new(Behaviour::Echo("unused")));

    let request = Request::builder()
        .method("GET")
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn provider_failure_is_server_error_with_reply() {
    let app = app_with(StubProvider::new(Behaviour::Fail));

    let (status, body) = send(app, chat_request(json!({ "message": "hello there" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "reply": PROVIDER_FAILURE_REPLY }));
}

#[tokio::test]
async fn unconfigured_provider_still_answers() {
    let app = build_app_with(
        &ApiConfig::default(),
        Arc::new(UnconfiguredProvider),
        CompletionSettings::default(),
    );

    let (status, body) = send(app, chat_request(json!({ "message": "hello there" }))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reply"], PROVIDER_FAILURE_REPLY);
}

#[tokio::test]
async fn empty_completion_uses_default_reply() {
    let app = app_with(StubProvider::new(Behaviour::Empty));

    let (status, body) = send(app, chat_request(json!({ "message": "hello there" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], EMPTY_COMPLETION_REPLY);
}

#[tokio::test]
async fn panic_during_turn_is_contained() {
    let app = app_with(StubProvider::new(Behaviour::Panic));

    let (status, body) = send(
        app.clone(),
        chat_request(json!({ "message": "hello there" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reply"], PROVIDER_FAILURE_REPLY);

    let (status, body) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["fallback_total"], 1);
    assert_eq!(body["metrics"]["turns_total"], 1);
    let avg_latency = body["metrics"]["avg_latency_millis"].as_f64().unwrap();
    assert!(avg_latency >= PANIC_DELAY_MILLIS as f64);
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let config = ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 2,
        ..ApiConfig::default()
    };
    let app = build_app_with(
        &config,
        StubProvider::new(Behaviour::Echo("ok")),
        CompletionSettings::default(),
    );

    let from = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(json!({ "message": "hello there" }).to_string()))
            .unwrap()
    };

    for _ in 0..2 {
        let (status, _) = send(app.clone(), from("198.51.100.7")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app.clone().oneshot(from("198.51.100.7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get("retry-after").is_some());

    let (status, _) = send(app, from("198.51.100.8")).await;
    assert_eq!(status, StatusCode::OK);
}
