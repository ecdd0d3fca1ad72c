//! Reporting views derived from result bundles.
//!
//! The trend view shows every metric any explainer has; the comparison view
//! only keeps metrics every explainer has and rescales their AUCs per metric.

use attrbench_core::MetricKey;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::benchmark::ResultBundle;

/// Y-axis label of every trend panel.
pub const TREND_Y_LABEL: &str = "Mean Model Output";

/// One explainer's curve inside a trend panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Explainer name.
    pub explainer: String,
    /// Legend label, `"<auc> - <explainer>"` with the AUC rounded to 3 places.
    pub label: String,
    /// Signed area under the curve.
    pub auc: f64,
    /// Shared x-axis.
    pub xs: Vec<f64>,
    /// Mean model output.
    pub ys: Vec<f64>,
}

/// All explainer curves for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPanel {
    /// Metric shown in the panel.
    pub key: MetricKey,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Whether the y-axis reads better inverted.
    pub invert_y: bool,
    /// Curves of the bundles that evaluated this metric.
    pub series: Vec<TrendSeries>,
}

/// Per-metric curves across explainers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrendView {
    /// One panel per metric in the union of all bundles.
    pub panels: Vec<TrendPanel>,
}

/// Normalized scores of one explainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Explainer name.
    pub explainer: String,
    /// Evenly spaced position of the explainer on the leading axis.
    pub anchor: f64,
    /// Min-max normalized AUC, one per compared metric.
    pub scores: Vec<f64>,
}

/// Relative performance of explainers on the metrics they all share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComparisonView {
    /// Explainer names in bundle order.
    pub explainers: Vec<String>,
    /// Metrics present in every bundle.
    pub metrics: Vec<MetricKey>,
    /// Metrics missing from at least one bundle.
    pub excluded: Vec<MetricKey>,
    /// One row per explainer.
    pub rows: Vec<ComparisonRow>,
}

/// Union of metric keys across bundles, in first-seen order.
pub fn union_metrics(bundles: &[ResultBundle]) -> Vec<MetricKey> {
    let keys: IndexSet<MetricKey> = bundles
        .iter()
        .flat_map(|bundle| bundle.metrics.iter().copied())
        .collect();
    keys.into_iter().collect()
}

/// Metric keys present in every bundle, ordered as in the first bundle.
pub fn comparable_metrics(bundles: &[ResultBundle]) -> Vec<MetricKey> {
    let Some((first, rest)) = bundles.split_first() else {
        return Vec::new();
    };
    let keys: IndexSet<MetricKey> = first
        .metrics
        .iter()
        .copied()
        .filter(|key| first.contains(key) && rest.iter().all(|bundle| bundle.contains(key)))
        .collect();
    keys.into_iter().collect()
}

/// Builds the trend view over all metrics any bundle evaluated.
pub fn trend_view(bundles: &[ResultBundle]) -> TrendView {
    let panels = union_metrics(bundles)
        .into_iter()
        .map(|key| TrendPanel {
            key,
            x_label: key.axis_label().to_string(),
            y_label: TREND_Y_LABEL.to_string(),
            invert_y: key.inverts_y_axis(),
            series: bundles
                .iter()
                .filter_map(|bundle| {
                    bundle.get(&key).map(|result| TrendSeries {
                        explainer: bundle.name.clone(),
                        label: format!("{} - {}", format_auc(result.auc), bundle.name),
                        auc: result.auc,
                        xs: result.xs.clone(),
                        ys: result.ys.clone(),
                    })
                })
                .collect(),
        })
        .collect();
    TrendView { panels }
}

/// Builds the comparison view over the metrics every bundle evaluated.
///
/// Each metric's AUCs are rescaled onto `[0, 1]` across explainers. When all
/// explainers share one AUC the metric cannot separate them and every score is
/// `0.5`.
pub fn comparison_view(bundles: &[ResultBundle]) -> ComparisonView {
    let metrics = comparable_metrics(bundles);
    let excluded: Vec<MetricKey> = union_metrics(bundles)
        .into_iter()
        .filter(|key| !metrics.contains(key))
        .collect();
    if !excluded.is_empty() {
        warn!(
            excluded = ?excluded.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "metrics missing from some explainers are left out of the comparison"
        );
    }

    let count = bundles.len();
    let mut rows: Vec<ComparisonRow> = bundles
        .iter()
        .enumerate()
        .map(|(idx, bundle)| ComparisonRow {
            explainer: bundle.name.clone(),
            anchor: if count > 1 {
                idx as f64 / (count - 1) as f64
            } else {
                0.0
            },
            scores: Vec::with_capacity(metrics.len()),
        })
        .collect();

    for key in &metrics {
        let aucs: Vec<f64> = bundles
            .iter()
            .filter_map(|bundle| bundle.get(key).map(|result| result.auc))
            .collect();
        let min = aucs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = aucs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range == 0.0 {
            warn!(metric = %key, "all explainers share one auc; normalizing to 0.5");
        }
        for (row, auc) in rows.iter_mut().zip(aucs) {
            row.scores.push(if range == 0.0 { 0.5 } else { (auc - min) / range });
        }
    }

    ComparisonView {
        explainers: bundles.iter().map(|bundle| bundle.name.clone()).collect(),
        metrics,
        excluded,
        rows,
    }
}

/// AUC rounded to 3 places, always with a decimal point and never `-0.0`.
fn format_auc(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    if rounded.is_finite() && rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}
