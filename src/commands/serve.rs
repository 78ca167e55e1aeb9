use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::daily_store::DailyStore;
use crate::metrics::init_metrics;
use crate::web::{AppState, start_web_server};

/// Handle the serve command
pub async fn handle_serve(
    interface: String,
    port: u16,
    data_dir: PathBuf,
    static_dir: PathBuf,
    enable_metrics: bool,
) -> Result<()> {
    if !data_dir.is_dir() {
        warn!(
            "Data directory {} does not exist yet; every range will be empty until files are converted",
            data_dir.display()
        );
    }
    if !static_dir.join("index.html").is_file() {
        warn!(
            "No index.html in {}; the front end will not be served",
            static_dir.display()
        );
    }

    let store = DailyStore::new(data_dir);
    match store.days() {
        Ok(days) => match (days.first(), days.last()) {
            (Some(first), Some(last)) => {
                info!("{} daily files available ({} to {})", days.len(), first, last)
            }
            _ => info!("No daily files available"),
        },
        Err(e) => warn!("Could not list daily files: {:#}", e),
    }

    let mut state = AppState::new(store, static_dir);
    if enable_metrics {
        state = state.with_metrics(init_metrics()?);
        info!("Prometheus metrics available at /metrics");
    }

    start_web_server(interface, port, state).await
}
