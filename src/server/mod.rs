//! HTTP wrapper around the prediction service.

pub mod routes;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::fallback::HeuristicEstimator;
use crate::monitoring::PredictionLogger;
use crate::service::PredictionService;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no model could be loaded; requests get the heuristic estimate.
    pub service: Option<Arc<PredictionService>>,
    pub fallback: Arc<HeuristicEstimator>,
    pub default_location: String,
    pub audit: Option<Arc<PredictionLogger>>,
}

impl AppState {
    pub fn model_loaded(&self) -> bool {
        self.service.is_some()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .route("/listings/price-insights", post(routes::listing_price_insights))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}
