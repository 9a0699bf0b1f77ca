use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::features::{AttributeError, RequestAttributes};
use crate::listing::{listing_attributes, Listing};
use crate::monitoring::logger::{PredictionRecord, PriceSource};
use crate::server::AppState;
use crate::service::{ErrorKind, PredictionError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::InputError => StatusCode::BAD_REQUEST,
            ErrorKind::DependencyPrecondition => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "model_loaded": state.model_loaded(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Bodies that fail to parse get the same error shape as invalid attributes.
fn rejected(rejection: JsonRejection) -> Response {
    PredictionError::from(AttributeError::MalformedBody(rejection.body_text())).into_response()
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RequestAttributes>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(attrs)) => price(&state, &attrs).await,
        Err(rejection) => rejected(rejection),
    }
}

/// Price a stored listing.
pub async fn listing_price_insights(
    State(state): State<AppState>,
    payload: Result<Json<Listing>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(listing)) => price(&state, &listing_attributes(&listing)).await,
        Err(rejection) => rejected(rejection),
    }
}

async fn price(state: &AppState, attrs: &RequestAttributes) -> Response {
    match &state.service {
        Some(service) => {
            let location = match service.location(attrs) {
                Ok(location) => location,
                Err(e) => return PredictionError::from(e).into_response(),
            };
            match service.predict(attrs) {
                Ok(result) => {
                    audit(state, PredictionRecord {
                        location: location.to_string(),
                        predicted_price: result.predicted_price,
                        confidence: result.confidence,
                        demand: Some(result.features_used.demand),
                        event_count: Some(result.features_used.events.count),
                        season: Some(result.features_used.season),
                        source: PriceSource::Model,
                    })
                    .await;
                    Json(result).into_response()
                }
                Err(e) => {
                    if e.kind() == ErrorKind::DependencyPrecondition {
                        warn!("Scorer rejected feature vector: {}", e);
                    }
                    e.into_response()
                }
            }
        }
        None => {
            let estimate = attrs.location().and_then(|location| {
                let location = location.unwrap_or(state.default_location.as_str());
                state
                    .fallback
                    .estimate(attrs, location)
                    .map(|estimate| (location, estimate))
            });
            match estimate {
                Ok((location, estimate)) => {
                    audit(state, PredictionRecord {
                        location: location.to_string(),
                        predicted_price: estimate.predicted_price,
                        confidence: estimate.confidence,
                        demand: None,
                        event_count: None,
                        season: None,
                        source: PriceSource::Fallback,
                    })
                    .await;
                    Json(estimate).into_response()
                }
                Err(e) => PredictionError::from(e).into_response(),
            }
        }
    }
}

/// File I/O runs on the blocking pool.
async fn audit(state: &AppState, record: PredictionRecord) {
    let Some(logger) = state.audit.clone() else {
        return;
    };

    let written = tokio::task::spawn_blocking(move || logger.log_prediction(&record)).await;
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to write prediction log: {}", e),
        Err(e) => warn!("Prediction log task failed: {}", e),
    }
}
