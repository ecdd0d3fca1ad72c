use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{BenchError, ErrorInfo};
use crate::model::LinearModel;

/// Per-sample, per-feature importance scores.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributions {
    /// One attribution row per sample.
    pub values: Vec<Vec<f64>>,
}

impl From<Vec<Vec<f64>>> for Attributions {
    fn from(values: Vec<Vec<f64>>) -> Self {
        Self { values }
    }
}

/// Explanation method producing attributions for a batch of samples.
pub trait Explainer {
    /// Display name, if the method has one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Computes one attribution row per sample.
    fn explain(&self, samples: &[Vec<f64>]) -> Result<Attributions, BenchError>;
}

impl<F> Explainer for F
where
    F: Fn(&[Vec<f64>]) -> Result<Attributions, BenchError>,
{
    fn explain(&self, samples: &[Vec<f64>]) -> Result<Attributions, BenchError> {
        self(samples)
    }
}

/// Where the attributions of one benchmark run come from.
pub enum AttributionSource {
    /// Attributions computed ahead of time, aligned with the samples.
    Precomputed {
        /// Optional display name.
        name: Option<String>,
        /// One row per sample.
        values: Vec<Vec<f64>>,
    },
    /// An explainer evaluated on the samples.
    Explainer(Box<dyn Explainer>),
}

impl AttributionSource {
    /// Precomputed attributions without a name.
    pub fn precomputed(values: Vec<Vec<f64>>) -> Self {
        AttributionSource::Precomputed { name: None, values }
    }

    /// Wraps an explainer.
    pub fn explainer(explainer: impl Explainer + 'static) -> Self {
        AttributionSource::Explainer(Box::new(explainer))
    }

    /// Name exposed by the source, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            AttributionSource::Precomputed { name, .. } => name.as_deref(),
            AttributionSource::Explainer(explainer) => explainer.name(),
        }
    }

    /// Produces attributions for `samples`, checking that rows align.
    pub fn resolve(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, BenchError> {
        let values = match self {
            AttributionSource::Precomputed { values, .. } => values.clone(),
            AttributionSource::Explainer(explainer) => explainer.explain(samples)?.values,
        };
        if values.len() != samples.len() {
            return Err(BenchError::ShapeMismatch(
                ErrorInfo::new("attribution-rows", "attribution rows do not match samples")
                    .with_context("samples", samples.len())
                    .with_context("attributions", values.len()),
            ));
        }
        Ok(values)
    }
}

impl std::fmt::Debug for AttributionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributionSource::Precomputed { name, values } => f
                .debug_struct("Precomputed")
                .field("name", name)
                .field("rows", &values.len())
                .finish(),
            AttributionSource::Explainer(explainer) => f
                .debug_struct("Explainer")
                .field("name", &explainer.name())
                .finish_non_exhaustive(),
        }
    }
}

/// Exact attributions of a linear model: `w_j * (x_j - mean_j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExplainer {
    name: String,
    weights: Vec<f64>,
    means: Vec<f64>,
}

impl LinearExplainer {
    /// Builds the explainer from a model and background feature means.
    pub fn new(
        name: impl Into<String>,
        model: &LinearModel,
        means: Vec<f64>,
    ) -> Result<Self, BenchError> {
        if means.len() != model.weights.len() {
            return Err(BenchError::shape(
                "linear-means",
                "feature means",
                model.weights.len(),
                means.len(),
            ));
        }
        Ok(Self {
            name: name.into(),
            weights: model.weights.clone(),
            means,
        })
    }
}

impl Explainer for LinearExplainer {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn explain(&self, samples: &[Vec<f64>]) -> Result<Attributions, BenchError> {
        samples
            .iter()
            .map(|sample| {
                if sample.len() != self.weights.len() {
                    return Err(BenchError::shape(
                        "linear-sample",
                        "sample",
                        self.weights.len(),
                        sample.len(),
                    ));
                }
                Ok(sample
                    .iter()
                    .zip(&self.weights)
                    .zip(&self.means)
                    .map(|((x, w), mean)| w * (x - mean))
                    .collect())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Attributions::from)
    }
}

/// Seeded uniform noise in `[-1, 1)`, a lower bound any real method should beat.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomExplainer {
    name: String,
    seed: u64,
}

impl RandomExplainer {
    /// Creates the baseline with a fixed seed.
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            seed,
        }
    }
}

impl Explainer for RandomExplainer {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn explain(&self, samples: &[Vec<f64>]) -> Result<Attributions, BenchError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(samples
            .iter()
            .map(|sample| {
                sample
                    .iter()
                    .map(|_| rng.gen_range(-1.0..1.0))
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<_>>()
            .into())
    }
}

/// Assigns the same score to every feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExplainer {
    name: String,
    value: f64,
}

impl ConstantExplainer {
    /// Creates the baseline.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Explainer for ConstantExplainer {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn explain(&self, samples: &[Vec<f64>]) -> Result<Attributions, BenchError> {
        Ok(samples
            .iter()
            .map(|sample| vec![self.value; sample.len()])
            .collect::<Vec<_>>()
            .into())
    }
}
