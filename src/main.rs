mod config;
mod context;
mod fallback;
mod features;
mod insights;
mod listing;
mod monitoring;
mod scoring;
mod server;
mod service;

use anyhow::{Context, Result};
use config::{Config, EnvConfig};
use context::ContextProvider;
use fallback::HeuristicEstimator;
use features::FeatureAssembler;
use monitoring::PredictionLogger;
use scoring::FittedScorer;
use server::AppState;
use service::PredictionService;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let env_config = EnvConfig::load()?;
    let mut config = Config::load(&env_config.config_path)?;
    config.apply_env(&env_config);

    monitoring::init_tracing(config.monitoring.json_logs);

    tracing::info!("Rental pricer starting...");
    tracing::info!("Config: {}", env_config.config_path);
    tracing::info!("Default location: {}", config.context.default_location);

    let service = match FittedScorer::load(
        Path::new(&config.model.scaler_path),
        Path::new(&config.model.model_path),
    ) {
        Ok(scorer) => {
            let service = PredictionService::new(
                ContextProvider::new(config.context.tables.clone()),
                FeatureAssembler::new(config.defaults),
                Arc::new(scorer),
            )
            .with_default_location(config.context.default_location.clone());
            Some(Arc::new(service))
        }
        Err(e) if config.model.allow_fallback => {
            tracing::warn!("Model not loaded, serving heuristic estimates: {:#}", e);
            None
        }
        Err(e) => return Err(e).context("Model artifacts are required (model.allow_fallback = false)"),
    };

    let audit = if config.monitoring.csv_logging {
        tracing::info!("Prediction log: {}", config.monitoring.csv_log_path);
        Some(Arc::new(PredictionLogger::new(&config.monitoring.csv_log_path)?))
    } else {
        None
    };

    let state = AppState {
        service,
        fallback: Arc::new(HeuristicEstimator::new(config.defaults)),
        default_location: config.context.default_location.clone(),
        audit,
    };

    tracing::info!("Model loaded: {}", state.model_loaded());

    server::serve(&config.bind_address(), state).await
}
