use serde::{Deserialize, Serialize};

use crate::errors::{BenchError, ErrorInfo};

/// Predictive model evaluated on batches of perturbed samples.
///
/// One output value is produced per input row.
pub trait Model {
    /// Evaluates the model on a batch of rows.
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>, BenchError>;
}

impl<F> Model for F
where
    F: Fn(&[Vec<f64>]) -> Result<Vec<f64>, BenchError>,
{
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>, BenchError> {
        self(batch)
    }
}

/// Evaluates `model` and averages its outputs along the batch axis.
pub fn mean_output<M: Model + ?Sized>(model: &M, batch: &[Vec<f64>]) -> Result<f64, BenchError> {
    let outputs = model.predict(batch)?;
    if outputs.is_empty() {
        return Err(BenchError::External(
            ErrorInfo::new("model-empty-output", "model returned no outputs")
                .with_context("rows", batch.len()),
        ));
    }
    Ok(outputs.iter().sum::<f64>() / outputs.len() as f64)
}

/// Affine model `w . x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Per-feature weights.
    pub weights: Vec<f64>,
    /// Constant offset.
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    /// Creates a model from its weights and intercept.
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }
}

impl Model for LinearModel {
    fn predict(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>, BenchError> {
        batch
            .iter()
            .map(|row| {
                if row.len() != self.weights.len() {
                    return Err(BenchError::shape(
                        "model-input",
                        "model input row",
                        self.weights.len(),
                        row.len(),
                    ));
                }
                Ok(row
                    .iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.intercept)
            })
            .collect()
    }
}
