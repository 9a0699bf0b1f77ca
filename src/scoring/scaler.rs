use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::scoring::{check_width, ScorerError};

/// Per-feature standardisation fitted on training data.
///
/// Loaded from a JSON artifact exported alongside the model weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Training-data column names that predate the current feature names.
fn canonical_feature_name(name: &str) -> &str {
    match name {
        "event" => "event_major_flag",
        "local_events_count" => "event_count",
        "weather_conditions" => "weather_flag",
        other => other,
    }
}

impl StandardScaler {
    #[cfg(test)]
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            feature_names: None,
            mean,
            scale,
        }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Check the artifact against the feature layout the assembler produces.
    pub fn validate(&self) -> Result<(), ScorerError> {
        if self.scale.len() != self.mean.len() {
            return Err(ScorerError::InvalidArtifact(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        check_width(FeatureVector::NUM_FEATURES, self.width())?;

        if let Some(names) = &self.feature_names {
            check_width(FeatureVector::NUM_FEATURES, names.len())?;
            for (position, (found, expected)) in names
                .iter()
                .zip(FeatureVector::FEATURE_NAMES.iter())
                .enumerate()
            {
                if canonical_feature_name(found) != *expected {
                    return Err(ScorerError::FeatureOrder {
                        position,
                        expected: expected.to_string(),
                        found: found.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        check_width(self.width(), features.len())?;

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                // constant training columns are left unscaled
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}
