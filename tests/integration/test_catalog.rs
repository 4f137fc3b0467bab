//! Integration tests for the metadata and catalog endpoints.

use std::net::TcpListener;
use std::time::Duration;

use learnmate_tutor::{create_router, AppState, Config, Subject, SERVICE_NAME};
use serde_json::Value;

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Spawns the tutor server and returns its base URL.
async fn spawn_test_server(config: Config) -> String {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let router = create_router(AppState::new(config).expect("Failed to build state"));
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

async fn get_json(url: String) -> Value {
    let response = reqwest::get(url).await.expect("Request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.expect("Failed to parse body")
}

#[tokio::test]
async fn test_root_metadata() {
    let base = spawn_test_server(Config::default()).await;
    let body = get_json(format!("{base}/")).await;

    assert_eq!(body["status"], "running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"]["subjects"], "/api/tutor/subjects");
    assert_eq!(body["endpoints"]["health"], "/health");
}

/// Health answers even when no API key is configured.
#[tokio::test]
async fn test_health_without_api_key() {
    let base = spawn_test_server(Config::default()).await;
    let body = get_json(format!("{base}/health")).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], SERVICE_NAME);
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_subjects_in_declared_order() {
    let base = spawn_test_server(Config::default()).await;
    let response = reqwest::get(format!("{base}/api/tutor/subjects"))
        .await
        .unwrap();
    let text = response.text().await.unwrap();

    let positions: Vec<usize> = Subject::ALL
        .iter()
        .map(|subject| {
            text.find(&format!("\"{}\":", subject.as_str()))
                .unwrap_or_else(|| panic!("missing {subject}"))
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["subjects"]["mathematics"]["icon"], "🔢");
    assert_eq!(body["subjects"]["geography"]["name"], "Geography");
}

#[tokio::test]
async fn test_study_tips() {
    let base = spawn_test_server(Config::default()).await;
    let body = get_json(format!("{base}/api/tutor/study-tips")).await;

    let tips = body["tips"].as_array().unwrap();
    assert_eq!(tips.len(), 5);
    for tip in tips {
        assert!(tip["category"].is_string());
        assert!(tip["tip"].is_string());
        assert!(tip["icon"].is_string());
    }
}

#[tokio::test]
async fn test_cors_headers_for_configured_origin() {
    let config = Config {
        cors_origins: vec!["http://app.example".to_string()],
        ..Config::default()
    };
    let base = spawn_test_server(config).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header("origin", "http://app.example")
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://app.example"
    );
}

#[tokio::test]
async fn test_wildcard_cors_allows_any_origin() {
    let config = Config {
        cors_origins: vec!["*".to_string()],
        ..Config::default()
    };
    let base = spawn_test_server(config).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header("origin", "http://anywhere.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response
        .headers()
        .get("access-control-allow-credentials")
        .is_none());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let base = spawn_test_server(Config::default()).await;
    let response = reqwest::get(format!("{base}/api/tutor/nope")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
