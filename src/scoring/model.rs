use serde::{Deserialize, Serialize};

use crate::scoring::{check_width, ScorerError};

/// One node of a regression tree. Splits send `x[feature] <= threshold` left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A regression tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    #[cfg(test)]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Children must come after their parent, so traversal always ends.
    fn validate(&self, width: usize) -> Result<(), ScorerError> {
        if self.nodes.is_empty() {
            return Err(ScorerError::InvalidArtifact("empty tree".to_string()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= width {
                        return Err(ScorerError::InvalidArtifact(format!(
                            "node {} splits on feature {} of {}",
                            i, feature, width
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ScorerError::InvalidArtifact(format!(
                            "node {} has non-finite threshold",
                            i
                        )));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(ScorerError::InvalidArtifact(format!(
                                "node {} has invalid child {}",
                                i, child
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ScorerError::InvalidArtifact(format!(
                            "node {} has non-finite value",
                            i
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn evaluate(&self, x: &[f64]) -> Result<f64, ScorerError> {
        let mut index = 0;
        loop {
            let node = self.nodes.get(index).ok_or_else(|| {
                ScorerError::InvalidArtifact(format!("missing tree node {}", index))
            })?;

            match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Split { feature, threshold, left, right } => {
                    let value = x.get(*feature).ok_or(ScorerError::WidthMismatch {
                        expected: feature + 1,
                        actual: x.len(),
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Fitted regression model, tagged by `kind` in its JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// Averages the outputs of its trees.
    RandomForest { trees: Vec<Tree> },
}

impl RegressionModel {
    pub fn validate(&self, width: usize) -> Result<(), ScorerError> {
        match self {
            RegressionModel::Linear { coefficients, .. } => check_width(width, coefficients.len()),
            RegressionModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(ScorerError::InvalidArtifact(
                        "random forest has no trees".to_string(),
                    ));
                }
                trees.iter().try_for_each(|tree| tree.validate(width))
            }
        }
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, ScorerError> {
        match self {
            RegressionModel::Linear { intercept, coefficients } => {
                check_width(coefficients.len(), x.len())?;
                Ok(intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
            }
            RegressionModel::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(ScorerError::InvalidArtifact(
                        "random forest has no trees".to_string(),
                    ));
                }
                let mut total = 0.0;
                for tree in trees {
                    total += tree.evaluate(x)?;
                }
                Ok(total / trees.len() as f64)
            }
        }
    }
}
