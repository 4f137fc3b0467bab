//! Integration tests for the chat endpoint against a mock upstream.
//!
//! A local axum server stands in for the chat-completions API so the full
//! path (HTTP gateway, engine, reqwest client, fallback) runs over real
//! sockets.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use learnmate_tutor::{
    create_router, AppState, Config, Subject, TutorResponse, HISTORY_LIMIT, RESPONSE_CONFIDENCE,
};
use serde_json::{json, Value};

const MOCK_ANSWER: &str = "Factor out x: x(x + 3) = 0, so x = 0 or x = -3.";
const API_KEY: &str = "sk-integration";

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

// ============================================================================
// Mock upstream
// ============================================================================

/// How the mock upstream answers.
#[derive(Debug, Clone, Copy)]
enum Behavior {
    Answer,
    Fail(StatusCode),
    Malformed,
    Slow(Duration),
}

/// A request seen by the mock upstream.
#[derive(Debug, Clone)]
struct Recorded {
    authorization: Option<String>,
    body: Value,
}

struct MockUpstream {
    behavior: Behavior,
    requests: Mutex<Vec<Recorded>>,
}

impl MockUpstream {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

fn completion_body(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

async fn mock_completions(
    State(mock): State<Arc<MockUpstream>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    mock.requests
        .lock()
        .expect("mock lock poisoned")
        .push(Recorded {
            authorization,
            body,
        });

    match mock.behavior {
        Behavior::Answer => Json(completion_body(MOCK_ANSWER)).into_response(),
        Behavior::Fail(status) => (status, "upstream exploded").into_response(),
        Behavior::Malformed => (StatusCode::OK, "definitely not json").into_response(),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(completion_body(MOCK_ANSWER)).into_response()
        }
    }
}

/// Serves a router on a free port and returns its base URL.
async fn serve(router: Router) -> String {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://{addr}")
}

/// Spawns the mock upstream; returns its handle and base URL.
async fn spawn_upstream(behavior: Behavior) -> (Arc<MockUpstream>, String) {
    let mock = Arc::new(MockUpstream {
        behavior,
        requests: Mutex::new(Vec::new()),
    });
    let router = Router::new()
        .route("/chat/completions", post(mock_completions))
        .with_state(mock.clone());
    let url = serve(router).await;
    (mock, url)
}

fn config_for(upstream_url: &str, timeout_secs: u64) -> Config {
    Config {
        api_key: Some(API_KEY.to_string()),
        api_base_url: upstream_url.to_string(),
        upstream_timeout_secs: timeout_secs,
        ..Config::default()
    }
}

/// Spawns the tutor server and returns its base URL.
async fn spawn_tutor(config: Config) -> String {
    let state = AppState::new(config).expect("Failed to build state");
    serve(create_router(state)).await
}

async fn post_chat(base: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/tutor/chat"))
        .json(&body)
        .send()
        .await
        .expect("Failed to send chat request")
}

async fn chat_ok(base: &str, body: Value) -> TutorResponse {
    let response = post_chat(base, body).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.expect("Failed to parse tutor response")
}

// ============================================================================
// Live path
// ============================================================================

/// Tests the full request sent upstream and the answer returned.
#[tokio::test]
async fn test_live_answer_with_truncated_history() {
    let (mock, upstream) = spawn_upstream(Behavior::Answer).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let history: Vec<Value> = (0..12)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            json!({"role": role, "content": format!("turn {i}")})
        })
        .collect();

    let response = chat_ok(
        &tutor,
        json!({
            "message": "How do I solve x^2 + 3x = 0?",
            "conversation_history": history,
            "user_level": "Advanced"
        }),
    )
    .await;

    assert_eq!(response.response, MOCK_ANSWER);
    assert_eq!(response.subject_detected, Some(Subject::Mathematics));
    assert_eq!(response.suggestions.len(), 2);
    assert!((response.confidence - RESPONSE_CONFIDENCE).abs() < f64::EPSILON);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(
        sent.authorization.as_deref(),
        Some(format!("Bearer {API_KEY}").as_str())
    );

    let body = &sent.body;
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 500);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!((body["presence_penalty"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    assert!((body["frequency_penalty"].as_f64().unwrap() - 0.1).abs() < 1e-6);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), HISTORY_LIMIT + 2);
    assert_eq!(messages[0]["role"], "system");
    let system = messages[0]["content"].as_str().unwrap();
    assert!(system.contains("advanced level"));
    assert!(system.contains("asking about mathematics"));

    // Oldest two turns dropped
    assert_eq!(messages[1]["content"], "turn 2");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[HISTORY_LIMIT]["content"], "turn 11");
    assert_eq!(messages[HISTORY_LIMIT + 1]["role"], "user");
    assert_eq!(
        messages[HISTORY_LIMIT + 1]["content"],
        "How do I solve x^2 + 3x = 0?"
    );
}

/// Tests that a subject hint reaches the system prompt.
#[tokio::test]
async fn test_subject_hint_shapes_prompt() {
    let (mock, upstream) = spawn_upstream(Behavior::Answer).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let response = chat_ok(
        &tutor,
        json!({"message": "Tell me about the industrial revolution", "subject": "History"}),
    )
    .await;

    assert_eq!(response.subject_detected, Some(Subject::History));
    let requests = mock.requests();
    let system = requests[0].body["messages"][0]["content"].as_str().unwrap();
    assert!(system.contains("asking about history"));
    assert!(system.contains("beginner level"));
}

// ============================================================================
// Fallback path
// ============================================================================

async fn assert_fallback(behavior: Behavior, timeout_secs: u64) {
    let (mock, upstream) = spawn_upstream(behavior).await;
    let tutor = spawn_tutor(config_for(&upstream, timeout_secs)).await;

    let response = chat_ok(
        &tutor,
        json!({"message": "Explain photosynthesis", "subject": "biology"}),
    )
    .await;

    assert!(
        response.response.contains("offline mode"),
        "expected fallback for {behavior:?}, got: {}",
        response.response
    );
    assert!(response.response.contains("Biology is the study of life"));
    assert_eq!(response.subject_detected, Some(Subject::Biology));
    assert!(response.suggestions.len() <= 2);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_upstream_server_error_falls_back() {
    assert_fallback(Behavior::Fail(StatusCode::INTERNAL_SERVER_ERROR), 5).await;
}

#[tokio::test]
async fn test_upstream_auth_error_falls_back() {
    assert_fallback(Behavior::Fail(StatusCode::UNAUTHORIZED), 5).await;
}

#[tokio::test]
async fn test_upstream_rate_limit_falls_back() {
    assert_fallback(Behavior::Fail(StatusCode::TOO_MANY_REQUESTS), 5).await;
}

#[tokio::test]
async fn test_malformed_upstream_body_falls_back() {
    assert_fallback(Behavior::Malformed, 5).await;
}

#[tokio::test]
async fn test_upstream_timeout_falls_back() {
    let started = Instant::now();
    assert_fallback(Behavior::Slow(Duration::from_secs(4)), 1).await;
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_unreachable_upstream_falls_back() {
    let port = find_available_port();
    let tutor = spawn_tutor(config_for(&format!("http://127.0.0.1:{port}"), 2)).await;

    let response = chat_ok(&tutor, json!({"message": "What is Newton's law of gravity?"})).await;

    assert!(response.response.contains("offline mode"));
    assert_eq!(response.subject_detected, Some(Subject::Physics));
}

// ============================================================================
// Gateway checks
// ============================================================================

#[tokio::test]
async fn test_off_topic_never_reaches_upstream() {
    let (mock, upstream) = spawn_upstream(Behavior::Answer).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let response = chat_ok(&tutor, json!({"message": "Any gossip about the sports finals?"})).await;

    assert!(response.response.contains("educational topics"));
    assert_eq!(response.subject_detected, None);
    assert!((response.confidence - 1.0).abs() < f64::EPSILON);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let (mock, upstream) = spawn_upstream(Behavior::Answer).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let response = post_chat(&tutor, json!({"message": "  "})).await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Message cannot be empty");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_rejected() {
    let (mock, upstream) = spawn_upstream(Behavior::Answer).await;
    let config = Config {
        api_key: None,
        ..config_for(&upstream, 5)
    };
    let tutor = spawn_tutor(config).await;

    let response = post_chat(&tutor, json!({"message": "Explain photosynthesis"})).await;

    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("API key"));
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    assert!(mock.requests().is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

/// Tests that a slow upstream call does not block other endpoints.
#[tokio::test]
async fn test_health_responsive_during_slow_upstream() {
    let (_mock, upstream) = spawn_upstream(Behavior::Slow(Duration::from_secs(2))).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let chat_base = tutor.clone();
    let pending = tokio::spawn(async move {
        chat_ok(&chat_base, json!({"message": "Explain photosynthesis"})).await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let health = reqwest::get(format!("{tutor}/health")).await.unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(1));

    let response = pending.await.unwrap();
    assert_eq!(response.response, MOCK_ANSWER);
}

/// Tests that concurrent chats are served in parallel.
#[tokio::test]
async fn test_concurrent_chats() {
    let (mock, upstream) = spawn_upstream(Behavior::Slow(Duration::from_millis(500))).await;
    let tutor = spawn_tutor(config_for(&upstream, 5)).await;

    let started = Instant::now();
    let handles: Vec<_> = (0..5)
        .map(|i| {
            let base = tutor.clone();
            tokio::spawn(async move {
                chat_ok(&base, json!({"message": format!("Explain cell division, part {i}")}))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.response, MOCK_ANSWER);
        assert_eq!(response.subject_detected, Some(Subject::Biology));
    }

    assert!(started.elapsed() < Duration::from_millis(2000));
    assert_eq!(mock.requests().len(), 5);
}
