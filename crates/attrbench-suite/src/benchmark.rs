use std::time::Duration;

use attrbench_core::{
    AttributionSource, BenchError, ErrorInfo, MaskingAdapter, MetricKey, Model, Perturbation,
    SortOrder,
};
use attrbench_perturb::{SequentialPerturbation, PROGRESS_THRESHOLD};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Sort orders and perturbation modes whose cross-product is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricGrid {
    /// Sort orders, outer loop of the cross-product.
    #[serde(default = "MetricGrid::default_sort_orders")]
    pub sort_order: Vec<SortOrder>,
    /// Perturbation modes, inner loop of the cross-product.
    #[serde(default = "MetricGrid::default_perturbations")]
    pub perturbation: Vec<Perturbation>,
}

impl MetricGrid {
    fn default_sort_orders() -> Vec<SortOrder> {
        SortOrder::ALL.to_vec()
    }

    fn default_perturbations() -> Vec<Perturbation> {
        Perturbation::ALL.to_vec()
    }

    /// Creates a grid from explicit lists.
    pub fn new(sort_order: Vec<SortOrder>, perturbation: Vec<Perturbation>) -> Self {
        Self {
            sort_order,
            perturbation,
        }
    }

    /// Metric keys in evaluation order, duplicates dropped.
    pub fn keys(&self) -> Result<Vec<MetricKey>, BenchError> {
        if self.sort_order.is_empty() || self.perturbation.is_empty() {
            return Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("metric-grid-empty", "metric grid selects no metrics")
                    .with_context("sort_orders", self.sort_order.len())
                    .with_context("perturbations", self.perturbation.len()),
            ));
        }
        let keys: IndexSet<MetricKey> = self
            .sort_order
            .iter()
            .flat_map(|&order| {
                self.perturbation
                    .iter()
                    .map(move |&perturbation| MetricKey::new(perturbation, order))
            })
            .collect();
        Ok(keys.into_iter().collect())
    }
}

impl Default for MetricGrid {
    fn default() -> Self {
        Self::new(Self::default_sort_orders(), Self::default_perturbations())
    }
}

/// Aggregated curve and AUC stored for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Shared x-axis.
    pub xs: Vec<f64>,
    /// Mean model output along the x-axis.
    pub ys: Vec<f64>,
    /// Signed area under the curve.
    pub auc: f64,
}

/// All metrics evaluated for one explainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    /// Explainer name.
    pub name: String,
    /// Metric keys in evaluation order.
    pub metrics: Vec<MetricKey>,
    /// Results keyed by metric.
    pub values: IndexMap<MetricKey, MetricResult>,
}

impl ResultBundle {
    /// Result for `key`, if this bundle evaluated it.
    pub fn get(&self, key: &MetricKey) -> Option<&MetricResult> {
        self.values.get(key)
    }

    /// Whether this bundle evaluated `key`.
    pub fn contains(&self, key: &MetricKey) -> bool {
        self.values.contains_key(key)
    }
}

/// Knobs shared by every simulator run of a benchmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Suppresses progress reporting.
    pub silent: bool,
    /// Wall-clock time before progress is reported.
    pub progress_threshold: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            silent: false,
            progress_threshold: PROGRESS_THRESHOLD,
        }
    }
}

/// Evaluates every metric of `grid` for one attribution source.
///
/// The first failing metric aborts the whole evaluation; no partial bundle is
/// returned.
pub fn evaluate_explainer<M: Model + ?Sized>(
    model: &M,
    samples: &[Vec<f64>],
    masker: &MaskingAdapter,
    source: &AttributionSource,
    grid: &MetricGrid,
    name: impl Into<String>,
    options: RunOptions,
) -> Result<ResultBundle, BenchError> {
    let name = name.into();
    let keys = grid.keys()?;
    let attributions = source.resolve(samples)?;
    let mut values = IndexMap::with_capacity(keys.len());
    for key in &keys {
        debug!(explainer = %name, metric = %key, "evaluating metric");
        let score = SequentialPerturbation::new(masker, key.sort_order, key.perturbation)
            .with_progress_threshold(options.progress_threshold)
            .with_silent(options.silent)
            .score_attributions(model, samples, &attributions)?;
        values.insert(
            *key,
            MetricResult {
                xs: score.curve.xs,
                ys: score.curve.ys,
                auc: score.auc,
            },
        );
    }
    info!(explainer = %name, metrics = keys.len(), "benchmark bundle complete");
    Ok(ResultBundle {
        name,
        metrics: keys,
        values,
    })
}

/// Runs one model, dataset and masker against a sequence of explainers and
/// owns the resulting bundles.
pub struct BenchmarkSuite<'a, M: Model + ?Sized> {
    model: &'a M,
    samples: &'a [Vec<f64>],
    masker: &'a MaskingAdapter,
    grid: MetricGrid,
    options: RunOptions,
    bundles: Vec<ResultBundle>,
    next_placeholder: usize,
}

impl<'a, M: Model + ?Sized> BenchmarkSuite<'a, M> {
    /// Creates an empty suite.
    pub fn new(
        model: &'a M,
        samples: &'a [Vec<f64>],
        masker: &'a MaskingAdapter,
        grid: MetricGrid,
    ) -> Self {
        Self {
            model,
            samples,
            masker,
            grid,
            options: RunOptions::default(),
            bundles: Vec::new(),
            next_placeholder: 1,
        }
    }

    /// Replaces the run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluates `source` over the grid and stores its bundle.
    ///
    /// Sources without a name are labelled `explainer1`, `explainer2`, ...,
    /// skipping labels already in use. A failed evaluation consumes no label.
    pub fn evaluate(&mut self, source: &AttributionSource) -> Result<&ResultBundle, BenchError> {
        match source.name() {
            Some(name) => self.push_bundle(source, name.to_string())?,
            None => {
                let (index, name) = self.free_placeholder();
                self.push_bundle(source, name)?;
                self.next_placeholder = index + 1;
            }
        }
        Ok(&self.bundles[self.bundles.len() - 1])
    }

    /// Evaluates `source` under `name`, ignoring the source's own name.
    pub fn evaluate_named(
        &mut self,
        source: &AttributionSource,
        name: impl Into<String>,
    ) -> Result<&ResultBundle, BenchError> {
        self.push_bundle(source, name.into())?;
        Ok(&self.bundles[self.bundles.len() - 1])
    }

    /// `base` if no bundle uses it yet, otherwise the first free `base2`,
    /// `base3`, ...
    pub fn free_name(&self, base: &str) -> String {
        if !self.is_taken(base) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}{suffix}");
            if !self.is_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn is_taken(&self, name: &str) -> bool {
        self.bundles.iter().any(|bundle| bundle.name == name)
    }

    fn free_placeholder(&self) -> (usize, String) {
        let mut index = self.next_placeholder;
        loop {
            let name = format!("explainer{index}");
            if !self.is_taken(&name) {
                return (index, name);
            }
            index += 1;
        }
    }

    fn push_bundle(&mut self, source: &AttributionSource, name: String) -> Result<(), BenchError> {
        if self.is_taken(&name) {
            return Err(BenchError::InvalidConfiguration(
                ErrorInfo::new("duplicate-explainer", "explainer name already evaluated")
                    .with_context("name", &name),
            ));
        }
        let bundle = evaluate_explainer(
            self.model,
            self.samples,
            self.masker,
            source,
            &self.grid,
            name,
            self.options,
        )?;
        self.bundles.push(bundle);
        Ok(())
    }

    /// Bundles evaluated so far, in evaluation order.
    pub fn bundles(&self) -> &[ResultBundle] {
        &self.bundles
    }

    /// Consumes the suite, returning its bundles.
    pub fn into_bundles(self) -> Vec<ResultBundle> {
        self.bundles
    }
}
