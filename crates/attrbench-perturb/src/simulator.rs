//! Incremental masking of samples in attribution order.

use std::time::Duration;

use attrbench_core::{
    mean_output, AttributionSource, BenchError, ErrorInfo, MaskingAdapter, MetricKey, Model,
    Perturbation, SortOrder,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auc::score_auc;
use crate::curve::{AggregatedCurve, StepCurve};
use crate::progress::{
    ProgressObserver, ProgressTracker, SilentProgress, TracingProgress, PROGRESS_THRESHOLD,
};
use crate::ranking::RankingPolicy;

/// Outcome of one simulator run over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Metric the run evaluated.
    pub key: MetricKey,
    /// Per-sample step curves in input order.
    pub curves: Vec<StepCurve>,
    /// Resampled mean curve.
    pub curve: AggregatedCurve,
    /// Signed area under `curve`.
    pub auc: f64,
}

/// Sequential perturbation simulator for one sort order and perturbation mode.
///
/// Each call returns a fresh [`MetricScore`]; the simulator holds no results
/// between calls.
#[derive(Debug)]
pub struct SequentialPerturbation<'a> {
    masker: &'a MaskingAdapter,
    ranking: RankingPolicy,
    perturbation: Perturbation,
    progress_threshold: Duration,
    silent: bool,
}

impl<'a> SequentialPerturbation<'a> {
    /// Creates a simulator for typed modes.
    pub fn new(masker: &'a MaskingAdapter, sort_order: SortOrder, perturbation: Perturbation) -> Self {
        Self {
            masker,
            ranking: RankingPolicy::new(sort_order),
            perturbation,
            progress_threshold: PROGRESS_THRESHOLD,
            silent: false,
        }
    }

    /// Creates a simulator from mode names, failing on unrecognised values.
    pub fn from_modes(
        masker: &'a MaskingAdapter,
        sort_order: &str,
        perturbation: &str,
    ) -> Result<Self, BenchError> {
        Ok(Self::new(masker, sort_order.parse()?, perturbation.parse()?))
    }

    /// Overrides the wall-clock threshold after which progress is reported.
    pub fn with_progress_threshold(mut self, threshold: Duration) -> Self {
        self.progress_threshold = threshold;
        self
    }

    /// Suppresses progress reporting when `silent` is set.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Metric key evaluated by this simulator.
    pub fn key(&self) -> MetricKey {
        MetricKey::new(self.perturbation, self.ranking.order())
    }

    /// Records the step curve of a single sample.
    ///
    /// Features whose attribution sign is excluded by the sort order are never
    /// toggled; the curve holds its previous value at their steps, so a sample
    /// whose attributions are all excluded yields a constant curve.
    pub fn simulate_sample<M: Model + ?Sized>(
        &self,
        model: &M,
        sample: &[f64],
        attributions: &[f64],
    ) -> Result<StepCurve, BenchError> {
        let features = self.masker.feature_count(sample)?;
        if attributions.len() != features {
            return Err(BenchError::ShapeMismatch(
                ErrorInfo::new(
                    "attribution-length",
                    "attribution length differs from the masker feature count",
                )
                .with_context("expected", features)
                .with_context("actual", attributions.len()),
            ));
        }

        let order = self.ranking.order();
        let target = self.perturbation.target_state();
        let mut mask = vec![self.perturbation.initial_state(); features];
        let mut current = mean_output(model, &self.masker.apply(&mask, sample)?)?;
        let mut values = Vec::with_capacity(features + 1);
        values.push(current);

        for idx in self.ranking.rank(attributions) {
            if !order.skips(attributions[idx]) {
                mask[idx] = target;
                current = mean_output(model, &self.masker.apply(&mask, sample)?)?;
            }
            values.push(current);
        }
        Ok(StepCurve::new(values))
    }

    /// Records step curves for every sample in input order.
    pub fn simulate<M: Model + ?Sized>(
        &self,
        model: &M,
        samples: &[Vec<f64>],
        attributions: &[Vec<f64>],
        observer: &mut dyn ProgressObserver,
    ) -> Result<Vec<StepCurve>, BenchError> {
        if attributions.len() != samples.len() {
            return Err(BenchError::ShapeMismatch(
                ErrorInfo::new("attribution-rows", "attribution rows do not match samples")
                    .with_context("samples", samples.len())
                    .with_context("attributions", attributions.len()),
            ));
        }
        let key = self.key();
        debug!(metric = %key, samples = samples.len(), "simulating perturbation curves");
        let mut tracker = ProgressTracker::new(
            observer,
            key.to_string(),
            self.progress_threshold,
            samples.len(),
        );
        let mut curves = Vec::with_capacity(samples.len());
        for (idx, (sample, row)) in samples.iter().zip(attributions).enumerate() {
            let curve = self
                .simulate_sample(model, sample, row)
                .map_err(|err| annotate_sample(err, idx))?;
            curves.push(curve);
            tracker.tick(idx + 1);
        }
        tracker.finish();
        Ok(curves)
    }

    /// Scores already resolved attributions, reporting progress to `observer`.
    pub fn score_with<M: Model + ?Sized>(
        &self,
        model: &M,
        samples: &[Vec<f64>],
        attributions: &[Vec<f64>],
        observer: &mut dyn ProgressObserver,
    ) -> Result<MetricScore, BenchError> {
        if samples.is_empty() {
            return Err(BenchError::invalid(
                "samples-empty",
                "at least one sample is required to score a metric",
            ));
        }
        let curves = self.simulate(model, samples, attributions, observer)?;
        let curve = AggregatedCurve::from_curves(&curves)?;
        let key = self.key();
        let auc = score_auc(&curve, key);
        debug!(metric = %key, auc, "scored metric");
        Ok(MetricScore {
            key,
            curves,
            curve,
            auc,
        })
    }

    /// Scores already resolved attributions with the default progress
    /// reporting (tracing events, or nothing when silent).
    pub fn score_attributions<M: Model + ?Sized>(
        &self,
        model: &M,
        samples: &[Vec<f64>],
        attributions: &[Vec<f64>],
    ) -> Result<MetricScore, BenchError> {
        if self.silent {
            self.score_with(model, samples, attributions, &mut SilentProgress)
        } else {
            self.score_with(model, samples, attributions, &mut TracingProgress)
        }
    }

    /// Resolves attributions from `source` and scores them.
    pub fn score<M: Model + ?Sized>(
        &self,
        model: &M,
        samples: &[Vec<f64>],
        source: &AttributionSource,
    ) -> Result<MetricScore, BenchError> {
        let attributions = source.resolve(samples)?;
        self.score_attributions(model, samples, &attributions)
    }
}

fn annotate_sample(err: BenchError, idx: usize) -> BenchError {
    match err {
        BenchError::ShapeMismatch(info) => {
            BenchError::ShapeMismatch(info.with_context("sample", idx))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrbench_core::LinearModel;

    fn sum_model() -> LinearModel {
        LinearModel::new(vec![1.0, 1.0, 1.0], 0.0)
    }

    fn zero_masker() -> MaskingAdapter {
        MaskingAdapter::from_background(vec![vec![0.0, 0.0, 0.0]]).expect("masker")
    }

    #[test]
    fn remove_positive_walks_down_the_ranking() {
        let masker = zero_masker();
        let sim = SequentialPerturbation::new(&masker, SortOrder::Positive, Perturbation::Remove);
        let curve = sim
            .simulate_sample(&sum_model(), &[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0])
            .expect("curve");
        assert_eq!(curve.values(), &[6.0, 5.0, 3.0, 0.0]);
    }

    #[test]
    fn keep_absolute_reveals_features() {
        let masker = zero_masker();
        let sim = SequentialPerturbation::new(&masker, SortOrder::Absolute, Perturbation::Keep);
        let curve = sim
            .simulate_sample(&sum_model(), &[1.0, 2.0, 3.0], &[0.1, -5.0, 1.0])
            .expect("curve");
        assert_eq!(curve.values(), &[0.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn excluded_signs_hold_the_previous_value() {
        let masker = zero_masker();
        let sim = SequentialPerturbation::new(&masker, SortOrder::Positive, Perturbation::Remove);
        let curve = sim
            .simulate_sample(&sum_model(), &[1.0, 2.0, 3.0], &[-1.0, 2.0, 0.0])
            .expect("curve");
        assert_eq!(curve.values(), &[6.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn attribution_length_is_checked() {
        let masker = zero_masker();
        let sim = SequentialPerturbation::new(&masker, SortOrder::Positive, Perturbation::Remove);
        let err = sim
            .simulate(&sum_model(), &[vec![1.0, 2.0, 3.0]], &[vec![1.0]], &mut SilentProgress)
            .unwrap_err();
        match err {
            BenchError::ShapeMismatch(info) => {
                assert_eq!(info.code, "attribution-length");
                assert_eq!(info.context.get("sample").map(String::as_str), Some("0"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_modes_fail_at_construction() {
        let masker = zero_masker();
        assert!(matches!(
            SequentialPerturbation::from_modes(&masker, "sideways", "remove"),
            Err(BenchError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SequentialPerturbation::from_modes(&masker, "positive", "shuffle"),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let masker = zero_masker();
        let sim = SequentialPerturbation::new(&masker, SortOrder::Positive, Perturbation::Remove);
        let source = AttributionSource::precomputed(Vec::new());
        assert!(matches!(
            sim.score(&sum_model(), &[], &source),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }
}
