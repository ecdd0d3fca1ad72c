use std::fs;
use std::path::Path;
use std::time::Duration;

use attrbench_core::{
    from_yaml_slice, stable_hash_string, to_yaml_string, AttributionSource, BenchError,
    ConstantExplainer, DataSource, ErrorInfo, LinearExplainer, LinearModel, MaskerConfig,
    MaskingAdapter, RandomExplainer,
};
use serde::{Deserialize, Serialize};

use crate::benchmark::{MetricGrid, RunOptions};

fn io_error(code: &str, path: &Path, err: impl ToString) -> BenchError {
    BenchError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Model evaluated by a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSpec {
    /// Linear regression model.
    Linear {
        /// Per-feature coefficients.
        weights: Vec<f64>,
        /// Constant offset.
        #[serde(default)]
        intercept: f64,
    },
}

impl ModelSpec {
    /// Builds the linear model.
    pub fn build(&self) -> LinearModel {
        match self {
            ModelSpec::Linear { weights, intercept } => LinearModel::new(weights.clone(), *intercept),
        }
    }
}

/// Attribution source listed in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExplainerSpec {
    /// Attributions computed elsewhere.
    Precomputed {
        /// Display name; a placeholder is assigned when absent.
        #[serde(default)]
        name: Option<String>,
        /// Attribution rows aligned with the plan data.
        #[serde(with = "serde_yaml::with::singleton_map")]
        values: DataSource,
    },
    /// Exact attributions of the plan's linear model.
    Linear {
        /// Display name, `linear` by default with a numeric suffix when taken.
        #[serde(default)]
        name: Option<String>,
    },
    /// Seeded uniform noise baseline.
    Random {
        /// Display name, `random` by default with a numeric suffix when taken.
        #[serde(default)]
        name: Option<String>,
        /// Generator seed.
        seed: u64,
    },
    /// Same score for every feature.
    Constant {
        /// Display name, `constant` by default with a numeric suffix when taken.
        #[serde(default)]
        name: Option<String>,
        /// Score given to each feature.
        value: f64,
    },
}

impl ExplainerSpec {
    /// Name given in the plan, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            ExplainerSpec::Precomputed { name, .. }
            | ExplainerSpec::Linear { name }
            | ExplainerSpec::Random { name, .. }
            | ExplainerSpec::Constant { name, .. } => name.as_deref(),
        }
    }

    /// Base name used when the plan gives none; precomputed sources fall back
    /// to the `explainerN` placeholders instead.
    pub fn default_name(&self) -> Option<&'static str> {
        match self {
            ExplainerSpec::Precomputed { .. } => None,
            ExplainerSpec::Linear { .. } => Some("linear"),
            ExplainerSpec::Random { .. } => Some("random"),
            ExplainerSpec::Constant { .. } => Some("constant"),
        }
    }

    /// Builds the attribution source.
    ///
    /// Linear attributions are centred on the background column means, or on
    /// the fill value when the masker has no background.
    pub fn build(
        &self,
        model: &LinearModel,
        masker: &MaskerConfig,
        adapter: &MaskingAdapter,
        base_dir: &Path,
    ) -> Result<AttributionSource, BenchError> {
        let source = match self {
            ExplainerSpec::Precomputed { name, values } => AttributionSource::Precomputed {
                name: name.clone(),
                values: values.load(base_dir)?,
            },
            ExplainerSpec::Linear { name } => {
                let means = match (adapter.background(), masker) {
                    (Some(background), _) => background.column_means(),
                    (None, MaskerConfig::Constant { fill, .. }) => vec![*fill; model.weights.len()],
                    (None, _) => {
                        return Err(BenchError::invalid(
                            "linear-reference",
                            "linear explainer needs a background or constant masker",
                        ))
                    }
                };
                AttributionSource::explainer(LinearExplainer::new(
                    name.as_deref().unwrap_or("linear"),
                    model,
                    means,
                )?)
            }
            ExplainerSpec::Random { name, seed } => AttributionSource::explainer(
                RandomExplainer::new(name.as_deref().unwrap_or("random"), *seed),
            ),
            ExplainerSpec::Constant { name, value } => AttributionSource::explainer(
                ConstantExplainer::new(name.as_deref().unwrap_or("constant"), *value),
            ),
        };
        Ok(source)
    }
}

/// Progress reporting knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSpec {
    /// Suppress progress events.
    #[serde(default)]
    pub silent: bool,
    /// Seconds before progress is reported.
    #[serde(default = "ProgressSpec::default_threshold")]
    pub threshold_secs: f64,
}

impl ProgressSpec {
    fn default_threshold() -> f64 {
        5.0
    }

    /// Converts to run options, rejecting negative or non-finite thresholds.
    pub fn run_options(&self) -> Result<RunOptions, BenchError> {
        let threshold = Duration::try_from_secs_f64(self.threshold_secs).map_err(|err| {
            BenchError::InvalidConfiguration(
                ErrorInfo::new("progress-threshold", err.to_string())
                    .with_context("threshold_secs", self.threshold_secs),
            )
        })?;
        Ok(RunOptions {
            silent: self.silent,
            progress_threshold: threshold,
        })
    }
}

impl Default for ProgressSpec {
    fn default() -> Self {
        Self {
            silent: false,
            threshold_secs: Self::default_threshold(),
        }
    }
}

/// YAML benchmark plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPlan {
    /// Plan label copied into reports.
    pub name: String,
    /// Metrics to evaluate for every explainer.
    #[serde(default)]
    pub metrics: MetricGrid,
    /// Model under test.
    pub model: ModelSpec,
    /// Samples to explain.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub data: DataSource,
    /// Masking strategy.
    pub masker: MaskerConfig,
    /// Attribution sources, evaluated in order.
    pub explainers: Vec<ExplainerSpec>,
    /// Progress reporting.
    #[serde(default)]
    pub progress: ProgressSpec,
}

impl BenchmarkPlan {
    /// SHA-256 of the canonical JSON form.
    pub fn plan_hash(&self) -> Result<String, BenchError> {
        stable_hash_string(self)
    }

    /// Serializes the plan as YAML.
    pub fn to_yaml_string(&self) -> Result<String, BenchError> {
        to_yaml_string(self)
    }
}

/// Loads a plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<BenchmarkPlan, BenchError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| io_error("plan-read", plan_path, err))?;
    from_yaml_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let yaml = r#"
name: minimal
model: { type: linear, weights: [1.0, 2.0] }
data: { inline: [[1.0, 1.0]] }
masker: { type: constant, fill: 0.0, features: 2 }
explainers:
  - { type: random, seed: 7 }
"#;
        let plan: BenchmarkPlan = from_yaml_slice(yaml.as_bytes()).expect("plan");
        assert_eq!(plan.metrics, MetricGrid::default());
        assert_eq!(plan.progress, ProgressSpec::default());
        assert_eq!(plan.model.build().intercept, 0.0);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let spec = ProgressSpec {
            silent: false,
            threshold_secs: -1.0,
        };
        assert!(matches!(
            spec.run_options(),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn linear_explainer_centres_on_constant_fill() {
        let model = LinearModel::new(vec![2.0, 1.0], 0.0);
        let masker = MaskerConfig::Constant {
            fill: 1.0,
            features: 2,
        };
        let adapter = masker.build(Path::new(".")).expect("adapter");
        let source = ExplainerSpec::Linear { name: None }
            .build(&model, &masker, &adapter, Path::new("."))
            .expect("source");
        assert_eq!(source.name(), Some("linear"));
        let values = source.resolve(&[vec![3.0, 0.0]]).expect("values");
        assert_eq!(values, vec![vec![4.0, -1.0]]);
    }
}
