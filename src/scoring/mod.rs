//! Price scoring against an offline-fitted model.
//!
//! A [`Scorer`] is built once at startup and shared read-only between
//! requests. Fitting and exporting the artifacts happen elsewhere; this
//! module only loads and evaluates them.

pub mod fitted;
pub mod model;
pub mod scaler;

pub use fitted::FittedScorer;
pub use model::{Node, RegressionModel, Tree};
pub use scaler::StandardScaler;

/// Scaling and prediction over a fixed-width feature vector.
pub trait Scorer: Send + Sync {
    /// Normalise a raw feature vector the way the training data was.
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ScorerError>;

    /// Predict a price from a scaled feature vector.
    fn predict(&self, scaled: &[f64]) -> Result<f64, ScorerError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScorerError {
    #[error("expected {expected} features, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("feature {position} is '{found}', expected '{expected}'")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
}

pub(crate) fn check_width(expected: usize, actual: usize) -> Result<(), ScorerError> {
    if expected != actual {
        return Err(ScorerError::WidthMismatch { expected, actual });
    }
    Ok(())
}
