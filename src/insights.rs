use serde::Serialize;

use crate::context::ContextSignals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeasonalFactor {
    Low,
    Normal,
    Peak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherImpact {
    Neutral,
    Positive,
}

/// Human-readable labels explaining a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub demand_level: Level,
    pub event_impact: Level,
    pub seasonal_factor: SeasonalFactor,
    pub weather_impact: WeatherImpact,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedInsights {
    pub insights: Insights,
    pub confidence: f64,
}

/// Labels context signals and scores confidence from demand.
///
/// All thresholds are strict: a value sitting on a boundary takes the lower
/// bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightDeriver;

impl InsightDeriver {
    pub const BASE_CONFIDENCE: f64 = 70.0;
    pub const MAX_CONFIDENCE: f64 = 95.0;

    pub fn derive(&self, ctx: &ContextSignals) -> DerivedInsights {
        DerivedInsights {
            insights: Insights {
                demand_level: Self::demand_level(ctx.demand),
                event_impact: if ctx.event.major { Level::High } else { Level::Low },
                seasonal_factor: if ctx.season.code() == 3 {
                    SeasonalFactor::Peak
                } else {
                    SeasonalFactor::Normal
                },
                weather_impact: if ctx.weather {
                    WeatherImpact::Positive
                } else {
                    WeatherImpact::Neutral
                },
            },
            confidence: Self::confidence(ctx.demand),
        }
    }

    /// Rises half a point per demand point around 50. Capped at 95, no floor.
    pub fn confidence(demand: u32) -> f64 {
        (Self::BASE_CONFIDENCE + (f64::from(demand) - 50.0) * 0.5).min(Self::MAX_CONFIDENCE)
    }

    pub fn demand_level(demand: u32) -> Level {
        if demand > 80 {
            Level::High
        } else if demand > 60 {
            Level::Medium
        } else {
            Level::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EventInfo;
    use chrono::NaiveDate;

    fn ctx(demand: u32, major: bool, weather: bool, month: u32) -> ContextSignals {
        let date = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
        ContextSignals::with_date(demand, EventInfo { count: 3, major }, weather, date)
    }

    #[test]
    fn test_confidence_formula() {
        assert_eq!(InsightDeriver::confidence(50), 70.0);
        assert_eq!(InsightDeriver::confidence(90), 90.0);
        assert_eq!(InsightDeriver::confidence(130), 95.0);
        assert_eq!(InsightDeriver::confidence(0), 45.0);
    }

    #[test]
    fn test_confidence_is_monotonic() {
        let values: Vec<f64> = (0..=150).map(InsightDeriver::confidence).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_demand_boundaries() {
        assert_eq!(InsightDeriver::demand_level(80), Level::Medium);
        assert_eq!(InsightDeriver::demand_level(81), Level::High);
        assert_eq!(InsightDeriver::demand_level(60), Level::Low);
        assert_eq!(InsightDeriver::demand_level(61), Level::Medium);
    }

    #[test]
    fn test_labels() {
        let derived = InsightDeriver.derive(&ctx(90, true, true, 7));
        assert_eq!(
            derived.insights,
            Insights {
                demand_level: Level::High,
                event_impact: Level::High,
                seasonal_factor: SeasonalFactor::Peak,
                weather_impact: WeatherImpact::Positive,
            }
        );

        let derived = InsightDeriver.derive(&ctx(40, false, false, 10));
        assert_eq!(derived.insights.demand_level, Level::Low);
        assert_eq!(derived.insights.event_impact, Level::Low);
        assert_eq!(derived.insights.seasonal_factor, SeasonalFactor::Normal);
        assert_eq!(derived.insights.weather_impact, WeatherImpact::Neutral);
    }

    #[test]
    fn test_derive_is_pure() {
        let c = ctx(72, true, false, 3);
        assert_eq!(InsightDeriver.derive(&c), InsightDeriver.derive(&c));
    }

    #[test]
    fn test_insights_serialize_as_labels() {
        let derived = InsightDeriver.derive(&ctx(70, false, true, 1));
        let json = serde_json::to_value(derived.insights).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "demand_level": "Medium",
                "event_impact": "Low",
                "seasonal_factor": "Normal",
                "weather_impact": "Positive"
            })
        );
    }
}
