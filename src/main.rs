// Chordmood server entry point

use chordmood::config::Config;
use chordmood::model::ModelRegistry;
use chordmood::predictions::PredictionLog;
use chordmood::server::{self, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chordmood", about = "Mood-conditioned chord progression server")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = "chordmood.toml")]
    config: PathBuf,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = Config::load_or_default(&args.config);
    if let Some(port) = args.port {
        config.port = port;
    }

    let registry = ModelRegistry::load(&config.models_dir, &config.mappings_dir);
    if registry.available_moods().is_empty() {
        log::warn!("No mood models loaded; generation requests will all be rejected");
    }

    let prediction_log = match PredictionLog::open(&config.database_path) {
        Ok(db) => db,
        Err(e) => {
            log::error!(
                "Failed to open prediction log at {}: {}",
                config.database_path.display(),
                e
            );
            PredictionLog::open_in_memory()?
        }
    };

    let state = AppState {
        registry: Arc::new(registry),
        log: Arc::new(prediction_log),
        midi_dir: config.midi_dir.clone(),
        chord_cache_dir: config.chord_cache_dir.clone(),
    };

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Chordmood listening on {}", addr);

    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
