use anyhow::Result;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use metrics_exporter_prometheus::PrometheusHandle;
use mime_guess::from_path;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actions;
use crate::daily_store::DailyStore;

// App state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DailyStore>,
    /// Directory holding the built front end (index.html and assets)
    pub static_dir: Arc<PathBuf>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: DailyStore, static_dir: PathBuf) -> Self {
        Self {
            store: Arc::new(store),
            static_dir: Arc::new(static_dir),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

const INDEX_HTML: &str = "index.html";

/// Relative asset path from a percent-encoded request path, or `None` if it is
/// not valid UTF-8 once decoded or tries to leave the static dir
fn asset_path(request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}

fn cache_control_for(path: &str) -> &'static str {
    // Bundler output under assets/ is content-hashed
    if path.starts_with("assets/") {
        "public, max-age=31536000, immutable"
    } else {
        "public, max-age=3600"
    }
}

async fn serve_file(path: &Path, cache_control: &'static str) -> Option<Response> {
    let contents = tokio::fs::read(path).await.ok()?;
    let content_type = from_path(path).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
    Some((StatusCode::OK, headers, contents).into_response())
}

async fn handle_static_file(uri: Uri, State(state): State<AppState>) -> Response {
    let Some(relative) = asset_path(uri.path()) else {
        warn!("Rejected static path {}", uri.path());
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    // Existing file in the front-end build
    if !relative.as_os_str().is_empty() {
        let candidate = state.static_dir.join(&relative);
        let is_file = tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            let cache_control = cache_control_for(&relative.to_string_lossy());
            if let Some(response) = serve_file(&candidate, cache_control).await {
                return response;
            }
        }
    }

    // Everything else is handled by client-side routing
    let index = state.static_dir.join(INDEX_HTML);
    match serve_file(&index, "no-cache").await {
        Some(response) => response,
        None => {
            debug!("No {} in {}", INDEX_HTML, state.static_dir.display());
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

// Middleware for request logging with correlation ID
async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = Uuid::new_v4().to_string()[..8].to_string();
    let start_time = Instant::now();

    info!("Started {} {} [{}]", method, path, request_id);

    let response = next.run(request).await;
    let duration = start_time.elapsed();
    let status = response.status();

    metrics::histogram!("http_request_duration_seconds").record(duration.as_secs_f64());
    info!(
        "Completed {} {} [{}] {} in {:.2}ms",
        method,
        path,
        request_id,
        status.as_u16(),
        duration.as_secs_f64() * 1000.0
    );

    response
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/vessels", get(actions::get_vessels))
        .route("/health", get(actions::health_check))
        .with_state(state.clone());

    let mut app = Router::new().nest("/api", api_router);
    if state.metrics.is_some() {
        app = app.route("/metrics", get(metrics_handler));
    }

    app.fallback(handle_static_file)
        .with_state(state)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(CorsLayer::permissive())
}

pub async fn start_web_server(interface: String, port: u16, state: AppState) -> Result<()> {
    info!("Starting web server on {}:{}", interface, port);
    info!("Serving daily files from {}", state.store.dir().display());
    info!("Serving front end from {}", state.static_dir.display());

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", interface, port)).await?;
    info!("Web server listening on http://{}:{}", interface, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
