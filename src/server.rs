//! HTTP surface: one upload fanned out to every registered model.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::registry::ModelRegistry;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
}

/// Client-facing request error: a status code plus a `{"detail": ...}` body.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request<S: Into<String>>(detail: S) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the API router.
///
/// When `assets_dir` exists it is mounted as the fallback service, so API
/// routes keep precedence over the static frontend. The CORS layer is wide
/// open and the body limit is off; front this with something stricter
/// before exposing it publicly.
pub fn build_router(state: AppState, assets_dir: &Path) -> Router {
    let mut router = Router::new()
        .route("/remove-bg", post(remove_bg))
        .route("/models", get(list_models));

    if assets_dir.is_dir() {
        router = router
            .fallback_service(ServeDir::new(assets_dir).append_index_html_on_directories(true));
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is killed.
pub async fn serve(config: &ServerConfig, registry: Arc<ModelRegistry>) -> Result<()> {
    let router = build_router(AppState { registry }, &config.assets_dir);
    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

/// `POST /remove-bg`: run every registered model over the uploaded image.
///
/// Each model is one blocking unit on the worker thread pool; a failed
/// model becomes a `null` entry instead of failing the request. All units
/// are awaited to completion, with no per-unit timeout and no cancellation
/// when the client goes away.
async fn remove_bg(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Json<Map<String, Value>>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !content_type.starts_with("image/") {
            return Err(ApiError::bad_request("File must be an image"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
        upload = Some((content_type, bytes));
        break;
    }

    let Some((content_type, image_bytes)) = upload else {
        return Err(ApiError::bad_request("missing file upload"));
    };

    info!(
        content_type = %content_type,
        size = image_bytes.len(),
        models = state.registry.model_names().len(),
        "processing upload"
    );

    let mut tasks = Vec::with_capacity(state.registry.model_names().len());
    for name in state.registry.model_names() {
        let registry = Arc::clone(&state.registry);
        let task_name = name.clone();
        let image = image_bytes.clone();
        let task = tokio::task::spawn_blocking(move || {
            registry
                .get_or_create(&task_name)
                .and_then(|session| session.remove_background(&image))
        });
        tasks.push((name.clone(), task));
    }

    let mut results = Map::new();
    for (name, task) in tasks {
        let entry = match task.await {
            Ok(Ok(png)) => Value::String(data_uri("image/png", &png)),
            Ok(Err(e)) => {
                warn!(model = %name, error = %e, "background removal failed");
                Value::Null
            },
            Err(e) => {
                warn!(model = %name, error = %e, "processing task panicked");
                Value::Null
            },
        };
        results.insert(name, entry);
    }

    // The unmodified input rides along for side-by-side display.
    results.insert(
        "original".to_owned(),
        Value::String(data_uri(&content_type, &image_bytes)),
    );

    Ok(Json(results))
}

/// `GET /models`: the startup-registered model names, startup order.
async fn list_models(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.model_names().to_vec())
}

fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", BASE64.encode(bytes))
}
