use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::actions::json_error;
use crate::aggregate::{aggregate_range, parse_query_date};
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct VesselsQueryParams {
    /// First day, YYYY-MM-DD
    pub start_date: Option<String>,
    /// Last day (inclusive), YYYY-MM-DD
    pub end_date: Option<String>,
}

/// GET /api/vessels?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
/// Union of the daily files in range as one GeoJSON FeatureCollection
pub async fn get_vessels(
    State(state): State<AppState>,
    Query(params): Query<VesselsQueryParams>,
) -> Response {
    metrics::counter!("vessels.api.requests_total").increment(1);

    let (Some(start_date), Some(end_date)) = (
        params.start_date.filter(|s| !s.is_empty()),
        params.end_date.filter(|s| !s.is_empty()),
    ) else {
        metrics::counter!("vessels.api.bad_request_total").increment(1);
        return json_error(StatusCode::BAD_REQUEST, "Missing start_date or end_date")
            .into_response();
    };

    let (Ok(start), Ok(end)) = (
        parse_query_date(&start_date),
        parse_query_date(&end_date),
    ) else {
        metrics::counter!("vessels.api.bad_request_total").increment(1);
        return json_error(
            StatusCode::BAD_REQUEST,
            "Invalid date format. Use YYYY-MM-DD",
        )
        .into_response();
    };

    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || aggregate_range(start, end, store.as_ref()))
        .await;

    match result {
        Ok(Ok(collection)) => {
            info!(
                "Returning {} vessel positions for {} to {}",
                collection.len(),
                start,
                end
            );
            metrics::counter!("vessels.api.features_returned")
                .increment(collection.len() as u64);
            (StatusCode::OK, Json(collection)).into_response()
        }
        Ok(Err(e)) => {
            metrics::counter!("vessels.api.error_total").increment(1);
            error!("Failed to load vessel data: {:#}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load vessel data")
                .into_response()
        }
        Err(e) => {
            metrics::counter!("vessels.api.error_total").increment(1);
            error!("Vessel data task failed: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load vessel data")
                .into_response()
        }
    }
}
