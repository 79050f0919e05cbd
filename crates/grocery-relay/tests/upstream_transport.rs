//! End-to-end tests of the reqwest transport against a local mock upstream.

use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{test, web, App, HttpRequest, HttpResponse, HttpServer};
use grocery_relay::config::DEFAULT_MAX_BODY_BYTES;
use grocery_relay::server::{app, AppState};
use grocery_relay::AnthropicTransport;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Mock upstream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SeenRequest {
    api_key: Option<String>,
    version: Option<String>,
    content_type: Option<String>,
    body: Value,
}

enum CannedBody {
    Json(Value),
    Raw(&'static str),
}

struct MockUpstream {
    status: u16,
    body: CannedBody,
    delay: Option<Duration>,
    seen: Mutex<Vec<SeenRequest>>,
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

async fn mock_messages(
    state: web::Data<MockUpstream>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    state.seen.lock().unwrap().push(SeenRequest {
        api_key: header(&req, "x-api-key"),
        version: header(&req, "anthropic-version"),
        content_type: header(&req, "content-type"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    if let Some(delay) = state.delay {
        actix_rt::time::sleep(delay).await;
    }

    let mut resp = HttpResponse::build(StatusCode::from_u16(state.status).unwrap());
    match &state.body {
        CannedBody::Json(v) => resp.json(v.clone()),
        CannedBody::Raw(s) => resp.content_type(ContentType::html()).body(*s),
    }
}

fn start_upstream(status: u16, body: CannedBody) -> (String, web::Data<MockUpstream>) {
    start_slow_upstream(status, body, None)
}

/// Start a mock upstream on an ephemeral port; returns its messages URL.
fn start_slow_upstream(
    status: u16,
    body: CannedBody,
    delay: Option<Duration>,
) -> (String, web::Data<MockUpstream>) {
    let state = web::Data::new(MockUpstream {
        status,
        body,
        delay,
        seen: Mutex::new(Vec::new()),
    });
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let app_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/v1/messages", web::post().to(mock_messages))
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    actix_rt::spawn(server);

    (format!("http://127.0.0.1:{}/v1/messages", port), state)
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1/messages", port)
}

async fn relay(url: &str, body: Value) -> (StatusCode, Value) {
    relay_with_timeout(url, Duration::from_secs(10), body).await
}

async fn relay_with_timeout(url: &str, timeout: Duration, body: Value) -> (StatusCode, Value) {
    let transport = AnthropicTransport::new(url, Some(timeout)).unwrap();
    let state = web::Data::new(AppState::new(Arc::new(transport), "missing.html"));
    let service = test::init_service(app(state, DEFAULT_MAX_BODY_BYTES)).await;

    let req = test::TestRequest::post()
        .uri("/api/claude")
        .set_json(body)
        .to_request();
    let resp = test::call_service(&service, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn valid_body(api_key: &str) -> Value {
    json!({
        "api_key": api_key,
        "image_data": {"mediaType": "image/png", "base64": "AAAA"}
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_sends_expected_headers_and_body() {
    let upstream_body = json!({"content": [{"type": "text", "text": "[\"milk\"]"}]});
    let (url, upstream) = start_upstream(200, CannedBody::Json(upstream_body.clone()));

    let (status, body) = relay(&url, valid_body("sk-test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream_body);

    let seen = upstream.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].api_key.as_deref(), Some("sk-test"));
    assert_eq!(seen[0].version.as_deref(), Some("2023-06-01"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(seen[0].body["model"], json!("claude-sonnet-4-5-20250929"));
    assert_eq!(seen[0].body["max_tokens"], json!(1024));
    assert_eq!(
        seen[0].body["messages"][0]["content"][0]["source"],
        json!({"type": "base64", "media_type": "image/png", "data": "AAAA"})
    );
}

#[actix_rt::test]
async fn test_upstream_401_keeps_status_and_body() {
    let upstream_body = json!({
        "type": "error",
        "error": {"type": "authentication_error", "message": "invalid x-api-key"}
    });
    let (url, _upstream) = start_upstream(401, CannedBody::Json(upstream_body.clone()));

    let (status, body) = relay(&url, valid_body("sk-wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, upstream_body);
}

#[actix_rt::test]
async fn test_connection_refused_is_a_500() {
    let (status, body) = relay(&closed_port_url(), valid_body("sk-test")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(
        message.contains("error sending request"),
        "unexpected message: {message}"
    );
}

#[actix_rt::test]
async fn test_non_json_upstream_body_is_a_500() {
    let (url, upstream) = start_upstream(502, CannedBody::Raw("<html>Bad Gateway</html>"));

    let (status, body) = relay(&url, valid_body("sk-test")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("malformed upstream response"));
    assert_eq!(upstream.seen.lock().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_api_key_unusable_as_header_is_a_500() {
    let (url, upstream) = start_upstream(200, CannedBody::Json(json!({})));

    let (status, body) = relay(&url, valid_body("sk-test\nInjected: yes")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(upstream.seen.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_upstream_timeout_is_a_500() {
    let (url, upstream) = start_slow_upstream(
        200,
        CannedBody::Json(json!({"content": []})),
        Some(Duration::from_secs(3)),
    );

    let started = std::time::Instant::now();
    let (status, body) =
        relay_with_timeout(&url, Duration::from_secs(1), valid_body("sk-test")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(upstream.seen.lock().unwrap().len(), 1);
}
