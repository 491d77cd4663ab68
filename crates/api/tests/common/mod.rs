#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use perfman_api::config::ServerConfig;
use perfman_api::router::build_app_router;
use perfman_api::state::AppState;
use perfman_store::{open_store, Store, StoreOptions};

/// Multipart boundary used by [`MultipartBody`].
pub const BOUNDARY: &str = "perfman-test-boundary";

/// Build a test `ServerConfig` rooted at `data_dir`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(data_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_dir: data_dir.to_path_buf(),
        lock_timeout_ms: 30_000,
        max_upload_bytes: 16 * 1024 * 1024,
        frontend_dir: None,
    }
}

/// A running application over a temporary data directory.
///
/// The router is cloned for every request; all clones share one store.
pub struct TestApp {
    pub dir: TempDir,
    pub store: Store,
    pub router: Router,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router, with the production middleware
/// stack, over a fresh temporary data directory.
pub async fn build_test_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path());
    let store = open_store(dir.path(), StoreOptions::default().with_lock_timeout(Duration::from_secs(30)))
        .await
        .unwrap();

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state, &config);

    TestApp { dir, store, router }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_range(app: Router, uri: &str, range: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::RANGE, range)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_multipart(app: Router, uri: &str, body: MultipartBody) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body.finish()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Minimal `multipart/form-data` encoder for building upload requests.
#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an event over HTTP and return its id.
pub async fn create_event(app: &TestApp, name: &str) -> String {
    let response = post_json(app.app(), "/api/events", serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Create a performance over HTTP and return its id.
pub async fn create_performance(app: &TestApp, event_id: &str, name: &str) -> String {
    let response = post_json(
        app.app(),
        &format!("/api/events/{event_id}/performances"),
        serde_json::json!({ "name": name, "performer": "Ada" }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Upload `data` as a track of a performance and return the track JSON.
pub async fn upload_track(
    app: &TestApp,
    event_id: &str,
    performance_id: &str,
    filename: &str,
    data: &[u8],
) -> serde_json::Value {
    let body = MultipartBody::new()
        .file("file", filename, "audio/mpeg", data)
        .text("performer", "Ada");
    let response = post_multipart(
        app.app(),
        &format!("/api/events/{event_id}/performances/{performance_id}/upload"),
        body,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
