use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::context::types::as_flag;
use crate::context::{ContextProvider, EventInfo, Season};
use crate::features::{AttributeError, FeatureAssembler, RequestAttributes};
use crate::insights::{InsightDeriver, Insights};
use crate::scoring::{Scorer, ScorerError};

pub const DEFAULT_LOCATION: &str = "mumbai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputError,
    DependencyPrecondition,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("invalid request: {0}")]
    Input(#[from] AttributeError),

    #[error("scorer precondition failed: {0}")]
    DependencyPrecondition(#[from] ScorerError),
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::Input(_) => ErrorKind::InputError,
            PredictionError::DependencyPrecondition(_) => ErrorKind::DependencyPrecondition,
        }
    }
}

/// Context signals echoed back with a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturesUsed {
    pub demand: u32,
    pub events: EventInfo,
    #[serde(serialize_with = "as_flag")]
    pub weather: bool,
    pub season: Season,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub confidence: f64,
    pub insights: Insights,
    pub features_used: FeaturesUsed,
}

/// Runs one prediction: context, features, scoring, insights.
///
/// Holds only immutable state, so one instance serves concurrent requests.
pub struct PredictionService {
    context: ContextProvider,
    assembler: FeatureAssembler,
    scorer: Arc<dyn Scorer>,
    deriver: InsightDeriver,
    default_location: String,
}

impl PredictionService {
    pub fn new(
        context: ContextProvider,
        assembler: FeatureAssembler,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            context,
            assembler,
            scorer,
            deriver: InsightDeriver,
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    /// Location the request resolves against.
    pub fn location<'a>(&'a self, attrs: &'a RequestAttributes) -> Result<&'a str, AttributeError> {
        Ok(attrs.location()?.unwrap_or(self.default_location.as_str()))
    }

    pub fn predict(&self, attrs: &RequestAttributes) -> Result<PredictionResult, PredictionError> {
        self.predict_on(attrs, Local::now().date_naive())
    }

    pub fn predict_on(
        &self,
        attrs: &RequestAttributes,
        date: NaiveDate,
    ) -> Result<PredictionResult, PredictionError> {
        let location = self.location(attrs)?;
        let ctx = self.context.resolve_on(location, date);
        let features = self.assembler.assemble(attrs, &ctx)?;

        let scaled = self.scorer.transform(features.as_slice())?;
        let price = self.scorer.predict(&scaled)?;
        if !price.is_finite() {
            return Err(ScorerError::InvalidArtifact(format!(
                "model produced a non-finite price ({})",
                price
            ))
            .into());
        }

        let derived = self.deriver.derive(&ctx);

        debug!(
            "Predicted {:.2} for '{}' (demand={}, season={})",
            price,
            location,
            ctx.demand,
            ctx.season.code()
        );

        Ok(PredictionResult {
            predicted_price: round_to(price, 2),
            confidence: round_to(derived.confidence, 1),
            insights: derived.insights,
            features_used: FeaturesUsed {
                demand: ctx.demand,
                events: ctx.event,
                weather: ctx.weather,
                season: ctx.season,
            },
        })
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{Level, WeatherImpact};
    use crate::scoring::{FittedScorer, RegressionModel, StandardScaler};
    use serde_json::json;

    struct FixedScorer(f64);

    impl Scorer for FixedScorer {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
            Ok(features.to_vec())
        }

        fn predict(&self, _scaled: &[f64]) -> Result<f64, ScorerError> {
            Ok(self.0)
        }
    }

    /// Fails unless it receives exactly `width` features.
    struct NarrowScorer {
        width: usize,
    }

    impl Scorer for NarrowScorer {
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
            crate::scoring::check_width(self.width, features.len())?;
            Ok(features.to_vec())
        }

        fn predict(&self, _scaled: &[f64]) -> Result<f64, ScorerError> {
            Ok(0.0)
        }
    }

    fn service(scorer: impl Scorer + 'static) -> PredictionService {
        PredictionService::new(
            ContextProvider::default(),
            FeatureAssembler::default(),
            Arc::new(scorer),
        )
    }

    fn july() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 20).unwrap()
    }

    #[test]
    fn test_goa_end_to_end() {
        let attrs = RequestAttributes::new().with("location", "goa");
        let result = service(FixedScorer(150.0)).predict(&attrs).unwrap();

        assert_eq!(result.predicted_price, 150.0);
        assert_eq!(result.insights.demand_level, Level::High);
        assert_eq!(result.insights.event_impact, Level::High);
        assert_eq!(result.insights.weather_impact, WeatherImpact::Positive);
        assert_eq!(result.confidence, 90.0);
        assert_eq!(result.features_used.demand, 90);
        assert_eq!(result.features_used.events, EventInfo { count: 6, major: true });
    }

    #[test]
    fn test_rounding() {
        let result = service(FixedScorer(123.456789))
            .predict_on(&RequestAttributes::new().with("location", "pune"), july())
            .unwrap();
        assert_eq!(result.predicted_price, 123.46);
        // pune demand 70 -> 75.0
        assert_eq!(result.confidence, 75.0);

        let result = service(FixedScorer(99.994))
            .predict_on(&RequestAttributes::new().with("location", "Bangalore"), july())
            .unwrap();
        assert_eq!(result.predicted_price, 99.99);
        assert_eq!(result.confidence, 82.5);
    }

    #[test]
    fn test_default_location() {
        let svc = service(FixedScorer(1.0));
        let attrs = RequestAttributes::new();
        assert_eq!(svc.location(&attrs).unwrap(), "mumbai");

        let result = svc.predict_on(&attrs, july()).unwrap();
        assert_eq!(result.features_used.demand, 85);

        let svc = service(FixedScorer(1.0)).with_default_location("delhi");
        assert_eq!(svc.predict_on(&attrs, july()).unwrap().features_used.demand, 80);
    }

    #[test]
    fn test_response_shape() {
        let result = service(FixedScorer(150.0))
            .predict_on(&RequestAttributes::new().with("location", "goa"), july())
            .unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "predicted_price": 150.0,
                "confidence": 90.0,
                "insights": {
                    "demand_level": "High",
                    "event_impact": "High",
                    "seasonal_factor": "Peak",
                    "weather_impact": "Positive"
                },
                "features_used": {
                    "demand": 90,
                    "events": { "count": 6, "major": 1 },
                    "weather": 1,
                    "season": 3
                }
            })
        );
    }

    #[test]
    fn test_input_error() {
        let attrs = RequestAttributes::new().with("base_price", "lots");
        let err = service(FixedScorer(1.0)).predict(&attrs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputError);
        assert!(err.to_string().contains("base_price"));

        let attrs = RequestAttributes::new().with("location", json!({ "city": "goa" }));
        let err = service(FixedScorer(1.0)).predict(&attrs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputError);
    }

    #[test]
    fn test_scorer_mismatch_is_fatal() {
        let err = service(NarrowScorer { width: 12 })
            .predict(&RequestAttributes::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyPrecondition);
        assert!(err.to_string().contains("expected 12 features, got 14"));
    }

    #[test]
    fn test_non_finite_price_is_rejected() {
        let err = service(FixedScorer(f64::NAN))
            .predict_on(&RequestAttributes::new(), july())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyPrecondition);
        assert!(err.to_string().contains("non-finite"));

        // a linear model overflows on an extreme pass-through input
        let mut coefficients = vec![0.0; 14];
        coefficients[4] = 10.0;
        let scorer = FittedScorer::new(
            StandardScaler::new(vec![0.0; 14], vec![1.0; 14]),
            RegressionModel::Linear { intercept: 0.0, coefficients },
        )
        .unwrap();
        let attrs = RequestAttributes::new().with("base_price", 1e308);
        let err = service(scorer).predict_on(&attrs, july()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyPrecondition);
    }

    #[test]
    fn test_fitted_scorer_sees_assembled_order() {
        // Price depends only on base_price (index 4) and demand (index 0).
        let mut coefficients = vec![0.0; 14];
        coefficients[0] = 1.0;
        coefficients[4] = 1.0;
        let scorer = FittedScorer::new(
            StandardScaler::new(vec![0.0; 14], vec![1.0; 14]),
            RegressionModel::Linear { intercept: 0.0, coefficients },
        )
        .unwrap();

        let attrs = RequestAttributes::new()
            .with("location", "delhi")
            .with("base_price", 200);
        let result = service(scorer).predict_on(&attrs, july()).unwrap();
        assert_eq!(result.predicted_price, 280.0);
    }
}
