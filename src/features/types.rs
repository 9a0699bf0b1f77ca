use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NUM_FEATURES: usize = 14;

/// Fixed-order input to the price model.
///
/// The scorer was fitted against exactly this column order, so the order of
/// [`FeatureVector::FEATURE_NAMES`] is part of the model contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; NUM_FEATURES],
}

impl FeatureVector {
    pub const NUM_FEATURES: usize = NUM_FEATURES;

    pub const FEATURE_NAMES: [&'static str; NUM_FEATURES] = [
        "demand",
        "event_major_flag",
        "season",
        "competitor_price",
        "base_price",
        "location_score",
        "property_type",
        "amenities_score",
        "review_rating",
        "booking_lead_time",
        "event_count",
        "weather_flag",
        "day_of_week",
        "month",
    ];

    pub fn from_array(values: [f64; NUM_FEATURES]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[cfg(test)]
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        self.values
    }

    /// Look up a feature by name.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        Self::FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttributeError {
    #[error("field '{field}' must be numeric, got {found}")]
    NotNumeric { field: String, found: String },

    #[error("field '{field}' must be a string, got {found}")]
    NotText { field: String, found: String },

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Untyped request attributes, as received from the caller.
///
/// Every recognised key is optional. A key set to `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestAttributes(Map<String, Value>);

impl RequestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// The caller's location, if supplied.
    pub fn location(&self) -> Result<Option<&str>, AttributeError> {
        match self.present("location") {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(AttributeError::NotText {
                field: "location".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Coerce `key` to a number. Accepts numbers, booleans and numeric strings.
    pub fn number(&self, key: &str) -> Result<Option<f64>, AttributeError> {
        let value = match self.present(key) {
            None => return Ok(None),
            Some(v) => v,
        };

        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match parsed {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(AttributeError::NotNumeric {
                field: key.to_string(),
                found: value.to_string(),
            }),
        }
    }
}
