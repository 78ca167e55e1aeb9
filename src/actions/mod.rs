pub mod health;
pub mod vessels;

pub use health::*;
pub use vessels::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// JSON error body: `{"error": "<message>"}`
pub fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": message })))
}
