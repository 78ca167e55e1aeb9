use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vesselmap::commands::{handle_convert, handle_serve};
use vesselmap::log_format::TargetFirstFormat;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser)]
#[command(name = "vesselmap")]
#[command(about = "Daily vessel positions as GeoJSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Disable coloured log output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a folder of daily position CSVs into daily GeoJSON files
    Convert {
        /// Folder of daily CSV exports
        #[arg(long, env = "VESSELMAP_RAW_CSV_DIR", default_value = "data/raw_csv")]
        input_dir: PathBuf,

        /// Folder the daily GeoJSON files are written to
        #[arg(
            long,
            env = "VESSELMAP_GEOJSON_DIR",
            default_value = "data/processed_geojson"
        )]
        output_dir: PathBuf,

        /// Vessel list CSV (MMSI, Name, Country, Duration, Distance [Nm])
        #[arg(
            long,
            env = "VESSELMAP_VESSEL_LIST",
            default_value = "data/vessel_list/vessel_list.csv"
        )]
        vessel_list: PathBuf,

        /// Convert files on a thread pool instead of one at a time
        #[arg(long)]
        parallel: bool,
    },
    /// Serve the vessel API and the front end
    Serve {
        /// Interface to bind to
        #[arg(long, env = "VESSELMAP_INTERFACE", default_value = "127.0.0.1")]
        interface: String,

        /// Port to listen on
        #[arg(short, long, env = "VESSELMAP_PORT", default_value = "5000")]
        port: u16,

        /// Folder of daily GeoJSON files
        #[arg(
            long,
            env = "VESSELMAP_GEOJSON_DIR",
            default_value = "data/processed_geojson"
        )]
        data_dir: PathBuf,

        /// Built front end (must contain index.html)
        #[arg(long, env = "VESSELMAP_STATIC_DIR", default_value = "frontend/dist")]
        static_dir: PathBuf,

        /// Expose Prometheus metrics at /metrics
        #[arg(long, env = "VESSELMAP_METRICS")]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(TargetFirstFormat::new(!cli.no_color))
                .with_ansi(!cli.no_color),
        )
        .init();

    match cli.command {
        Commands::Convert {
            input_dir,
            output_dir,
            vessel_list,
            parallel,
        } => handle_convert(input_dir, output_dir, vessel_list, parallel).await,
        Commands::Serve {
            interface,
            port,
            data_dir,
            static_dir,
            metrics,
        } => handle_serve(interface, port, data_dir, static_dir, metrics).await,
    }
}
