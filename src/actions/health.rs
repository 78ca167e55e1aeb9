use axum::{http::StatusCode, response::IntoResponse, response::Json};
use serde_json::json;

/// Handler for GET /api/health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
