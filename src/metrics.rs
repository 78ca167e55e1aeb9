use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering scrapes
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        // Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ],
        )
        .context("Failed to set buckets for http_request_duration_seconds")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    initialize_serve_metrics();
    Ok(handle)
}

/// Initialize query metrics to zero so they show up before the first request
pub fn initialize_serve_metrics() {
    metrics::counter!("vessels.api.requests_total").absolute(0);
    metrics::counter!("vessels.api.bad_request_total").absolute(0);
    metrics::counter!("vessels.api.error_total").absolute(0);
    metrics::counter!("vessels.api.features_returned").absolute(0);
}
