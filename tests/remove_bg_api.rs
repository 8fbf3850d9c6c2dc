//! HTTP surface tests against a mock inference backend.

mod common;

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;
use tower::ServiceExt;

use bg_compare::{build_router, AppState, ModelRegistry};
use common::{MockBackend, FAKE_PNG};

const MODELS: &[&str] = &["alpha", "beta"];
const BOUNDARY: &str = "test-boundary";

fn test_registry(backend: Arc<MockBackend>) -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::with_models(backend, MODELS.iter().copied()).expect("registry"))
}

fn test_app(registry: Arc<ModelRegistry>) -> axum::Router {
    build_router(AppState { registry }, Path::new("no-such-assets-dir"))
}

fn multipart_body(field_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"input.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(field_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/remove-bg")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field_name, content_type, bytes)))
        .expect("build request")
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn rejects_non_image_content_type_without_inference() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(test_registry(Arc::clone(&backend)));

    let resp = app
        .oneshot(upload_request("file", "text/plain", b"not an image"))
        .await
        .expect("call app");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["detail"], "File must be an image");
    // Only the eager startup sessions exist, and none of them ran
    assert_eq!(backend.sessions_created.load(Ordering::SeqCst), MODELS.len());
    assert_eq!(backend.inference_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejects_upload_without_file_field() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(test_registry(Arc::clone(&backend)));

    let resp = app
        .oneshot(upload_request("picture", "image/png", b"pixels"))
        .await
        .expect("call app");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.inference_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn returns_one_entry_per_model_plus_original() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(test_registry(Arc::clone(&backend)));
    let upload = b"raw jpeg bytes";

    let resp = app
        .oneshot(upload_request("file", "image/jpeg", upload))
        .await
        .expect("call app");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    let object = body.as_object().expect("object body");
    assert_eq!(object.len(), MODELS.len() + 1);

    for model in MODELS {
        let uri = object[*model].as_str().expect("data uri");
        let encoded = uri
            .strip_prefix("data:image/png;base64,")
            .expect("png data uri prefix");
        assert_eq!(BASE64.decode(encoded).expect("valid base64"), FAKE_PNG);
    }

    let original = object["original"].as_str().expect("original entry");
    let encoded = original
        .strip_prefix("data:image/jpeg;base64,")
        .expect("original keeps its declared content type");
    assert_eq!(BASE64.decode(encoded).expect("valid base64"), upload);

    // Keys follow registry order, with the original appended last
    let keys: Vec<_> = object.keys().map(String::as_str).collect();
    assert_eq!(keys, ["alpha", "beta", "original"]);
}

#[tokio::test]
async fn failed_model_becomes_null_entry() {
    let backend = Arc::new(MockBackend::failing_inference(&["beta"]));
    let app = test_app(test_registry(backend));

    let resp = app
        .oneshot(upload_request("file", "image/png", b"pixels"))
        .await
        .expect("call app");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert!(body["beta"].is_null());
    let alpha = body["alpha"].as_str().expect("healthy sibling");
    assert!(alpha.starts_with("data:image/png;base64,"));
    assert!(body["original"].is_string());
}

#[tokio::test]
async fn all_models_failing_still_returns_ok_with_original() {
    let backend = Arc::new(MockBackend::failing_inference(MODELS));
    let app = test_app(test_registry(backend));

    let resp = app
        .oneshot(upload_request("file", "image/png", b"pixels"))
        .await
        .expect("call app");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert!(body["alpha"].is_null());
    assert!(body["beta"].is_null());
    assert!(body["original"].is_string());
}

#[tokio::test]
async fn models_endpoint_lists_startup_set_only() {
    let backend = Arc::new(MockBackend::new());
    let registry = test_registry(backend);

    // A dynamic session for an unregistered name must not leak into the list
    registry.get_or_create("gamma").expect("dynamic session");

    let app = test_app(Arc::clone(&registry));
    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/models")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("call app");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body, serde_json::json!(["alpha", "beta"]));
}
