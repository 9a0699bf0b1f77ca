use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::features::FeatureVector;
use crate::scoring::model::RegressionModel;
use crate::scoring::scaler::StandardScaler;
use crate::scoring::{check_width, Scorer, ScorerError};

/// A scaler and regression model fitted together on the same feature layout.
#[derive(Debug, Clone)]
pub struct FittedScorer {
    scaler: StandardScaler,
    model: RegressionModel,
}

impl FittedScorer {
    pub fn new(scaler: StandardScaler, model: RegressionModel) -> Result<Self, ScorerError> {
        scaler.validate()?;
        model.validate(scaler.width())?;
        Ok(Self { scaler, model })
    }

    /// Load both artifacts from JSON files.
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self> {
        let scaler: StandardScaler = read_json(scaler_path)?;
        let model: RegressionModel = read_json(model_path)?;

        let scorer = Self::new(scaler, model).with_context(|| {
            format!(
                "Model artifacts {} / {} do not match the {}-feature layout",
                scaler_path.display(),
                model_path.display(),
                FeatureVector::NUM_FEATURES
            )
        })?;

        info!(
            "Loaded price model from {} ({})",
            model_path.display(),
            scorer.describe()
        );
        Ok(scorer)
    }

    pub fn describe(&self) -> String {
        match &self.model {
            RegressionModel::Linear { .. } => "linear".to_string(),
            RegressionModel::RandomForest { trees } => format!("random forest, {} trees", trees.len()),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model artifact: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse model artifact: {}", path.display()))
}

impl Scorer for FittedScorer {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError> {
        self.scaler.transform(features)
    }

    fn predict(&self, scaled: &[f64]) -> Result<f64, ScorerError> {
        check_width(self.scaler.width(), scaled.len())?;
        self.model.predict(scaled)
    }
}
