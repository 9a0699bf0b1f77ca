use chrono::{Datelike, Local};
use serde::Serialize;

use crate::features::{AttributeError, FeatureDefaults, RequestAttributes};
use crate::insights::{Insights, Level, SeasonalFactor, WeatherImpact};

pub const FALLBACK_NOTE: &str = "ML model unavailable, using heuristic fallback";

const KNOWN_LOCATIONS: [&str; 8] = [
    "mumbai", "delhi", "bangalore", "pune", "goa", "kolkata", "chennai", "hyderabad",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEstimate {
    pub predicted_price: f64,
    pub confidence: f64,
    pub insights: Insights,
    pub error: String,
}

/// Rule-based price estimate for when no fitted model is available.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEstimator {
    defaults: FeatureDefaults,
}

struct Inputs {
    base_price: f64,
    competitor_price: f64,
    property_type: f64,
    amenities_score: f64,
    review_rating: f64,
}

impl HeuristicEstimator {
    pub fn new(defaults: FeatureDefaults) -> Self {
        Self { defaults }
    }

    pub fn estimate(
        &self,
        attrs: &RequestAttributes,
        location: &str,
    ) -> Result<FallbackEstimate, AttributeError> {
        self.estimate_in(attrs, location, Local::now().month())
    }

    pub fn estimate_in(
        &self,
        attrs: &RequestAttributes,
        location: &str,
        month: u32,
    ) -> Result<FallbackEstimate, AttributeError> {
        let d = &self.defaults;
        let inputs = Inputs {
            base_price: attrs.number("base_price")?.unwrap_or(d.base_price),
            competitor_price: attrs.number("competitor_price")?.unwrap_or(d.competitor_price),
            property_type: attrs.number("property_type")?.unwrap_or(d.property_type),
            amenities_score: attrs.number("amenities_score")?.unwrap_or(d.amenities_score),
            review_rating: attrs.number("review_rating")?.unwrap_or(d.review_rating),
        };
        let location = location.to_lowercase();

        let price = estimate_price(&inputs, &location, month);
        Ok(FallbackEstimate {
            predicted_price: price,
            confidence: estimate_confidence(&inputs, &location, price),
            insights: estimate_insights(&inputs, &location, month),
            error: FALLBACK_NOTE.to_string(),
        })
    }
}

fn location_multiplier(location: &str) -> f64 {
    match location {
        "mumbai" => 1.3,
        "delhi" => 1.2,
        "bangalore" => 1.15,
        "pune" | "chennai" | "hyderabad" => 1.1,
        "goa" => 1.25,
        "kolkata" => 1.05,
        _ => 1.0,
    }
}

fn type_multiplier(property_type: f64) -> f64 {
    if property_type.fract() != 0.0 {
        return 1.0;
    }
    match property_type as i64 {
        1 => 1.2,
        2 => 1.0,
        3 => 0.8,
        4 => 0.7,
        5 => 1.5,
        6 => 1.1,
        _ => 1.0,
    }
}

fn is_peak_month(month: u32) -> bool {
    month >= 10 || month <= 3
}

fn is_off_month(month: u32) -> bool {
    (6..=8).contains(&month)
}

fn estimate_price(inputs: &Inputs, location: &str, month: u32) -> f64 {
    let seasonal = if is_peak_month(month) {
        1.2
    } else if is_off_month(month) {
        0.9
    } else {
        1.0
    };

    let price = inputs.base_price
        * location_multiplier(location)
        * type_multiplier(inputs.property_type)
        * (0.5 + inputs.amenities_score / 100.0)
        * (0.8 + (inputs.review_rating - 1.0) * 0.1)
        * seasonal;

    (price * 0.7 + inputs.competitor_price * 0.3).round()
}

fn estimate_confidence(inputs: &Inputs, location: &str, price: f64) -> f64 {
    let mut confidence = 60.0;

    if KNOWN_LOCATIONS.contains(&location) {
        confidence += 15.0;
    }
    if (1.0..=6.0).contains(&inputs.property_type) {
        confidence += 10.0;
    }

    if inputs.amenities_score > 80.0 {
        confidence += 10.0;
    } else if inputs.amenities_score > 60.0 {
        confidence += 5.0;
    }

    if inputs.review_rating >= 4.5 {
        confidence += 10.0;
    } else if inputs.review_rating >= 4.0 {
        confidence += 5.0;
    }

    let ratio = price / inputs.base_price;
    if (0.8..=1.5).contains(&ratio) {
        confidence += 10.0;
    } else if (0.6..=2.0).contains(&ratio) {
        confidence += 5.0;
    }

    f64::clamp(confidence, 65.0, 95.0)
}

fn estimate_insights(inputs: &Inputs, location: &str, month: u32) -> Insights {
    let demand_level = if ["mumbai", "delhi", "bangalore", "goa"].contains(&location)
        && inputs.amenities_score > 80.0
    {
        Level::High
    } else if inputs.amenities_score < 50.0 {
        Level::Low
    } else {
        Level::Medium
    };

    let event_impact = if ["mumbai", "delhi", "bangalore"].contains(&location) {
        Level::High
    } else {
        Level::Medium
    };

    let seasonal_factor = if is_peak_month(month) {
        SeasonalFactor::Peak
    } else if is_off_month(month) {
        SeasonalFactor::Low
    } else {
        SeasonalFactor::Normal
    };

    let weather_impact = if ["goa", "mumbai"].contains(&location) {
        WeatherImpact::Positive
    } else {
        WeatherImpact::Neutral
    };

    Insights {
        demand_level,
        event_impact,
        seasonal_factor,
        weather_impact,
    }
}
