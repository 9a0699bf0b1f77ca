use serde::Deserialize;

use crate::context::ContextSignals;
use crate::features::types::{AttributeError, FeatureVector, RequestAttributes};

/// Values used for property attributes the request leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeatureDefaults {
    pub competitor_price: f64,
    pub base_price: f64,
    pub location_score: f64,
    pub property_type: f64,
    pub amenities_score: f64,
    pub review_rating: f64,
    pub booking_lead_time: f64,
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self {
            competitor_price: 120.0,
            base_price: 100.0,
            location_score: 80.0,
            property_type: 1.0,
            amenities_score: 70.0,
            review_rating: 4.0,
            booking_lead_time: 7.0,
        }
    }
}

/// Merges request attributes and context signals into a [`FeatureVector`].
///
/// Values are not range-checked; whatever coerces to a number passes through.
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    defaults: FeatureDefaults,
}

impl FeatureAssembler {
    pub fn new(defaults: FeatureDefaults) -> Self {
        Self { defaults }
    }

    pub fn assemble(
        &self,
        attrs: &RequestAttributes,
        ctx: &ContextSignals,
    ) -> Result<FeatureVector, AttributeError> {
        let d = &self.defaults;
        let field = |key: &str, default: f64| -> Result<f64, AttributeError> {
            Ok(attrs.number(key)?.unwrap_or(default))
        };

        Ok(FeatureVector::from_array([
            f64::from(ctx.demand),
            flag(ctx.event.major),
            f64::from(ctx.season.code()),
            field("competitor_price", d.competitor_price)?,
            field("base_price", d.base_price)?,
            field("location_score", d.location_score)?,
            field("property_type", d.property_type)?,
            field("amenities_score", d.amenities_score)?,
            field("review_rating", d.review_rating)?,
            field("booking_lead_time", d.booking_lead_time)?,
            f64::from(ctx.event.count),
            flag(ctx.weather),
            f64::from(ctx.day_of_week),
            f64::from(ctx.month),
        ]))
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
