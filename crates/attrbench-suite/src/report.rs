use std::fs;
use std::path::Path;

use attrbench_core::{to_canonical_json_bytes, BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::benchmark::{BenchmarkSuite, ResultBundle};
use crate::plan::{load_plan, BenchmarkPlan};
use crate::views::{comparison_view, trend_view, ComparisonView, TrendView};

/// Everything produced by one plan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Name of the plan that produced the report.
    pub plan_name: String,
    /// Stable hash of the plan.
    pub plan_hash: String,
    /// One bundle per explainer, in plan order.
    pub bundles: Vec<ResultBundle>,
    /// Per-metric curves.
    pub trend: TrendView,
    /// Normalized cross-explainer scores.
    pub comparison: ComparisonView,
}

impl BenchmarkReport {
    /// Assembles a report and its views from finished bundles.
    pub fn from_bundles(
        plan_name: impl Into<String>,
        plan_hash: impl Into<String>,
        bundles: Vec<ResultBundle>,
    ) -> Self {
        let trend = trend_view(&bundles);
        let comparison = comparison_view(&bundles);
        Self {
            plan_name: plan_name.into(),
            plan_hash: plan_hash.into(),
            bundles,
            trend,
            comparison,
        }
    }

    /// Fails on the first NaN or infinite AUC or curve value; JSON has no
    /// encoding for them.
    pub fn check_finite(&self) -> Result<(), BenchError> {
        for bundle in &self.bundles {
            for (key, result) in &bundle.values {
                let field = if !result.auc.is_finite() {
                    Some("auc")
                } else if result.ys.iter().any(|y| !y.is_finite()) {
                    Some("ys")
                } else if result.xs.iter().any(|x| !x.is_finite()) {
                    Some("xs")
                } else {
                    None
                };
                if let Some(field) = field {
                    return Err(BenchError::Serde(
                        ErrorInfo::new("report-non-finite", "report holds a non-finite value")
                            .with_context("explainer", &bundle.name)
                            .with_context("metric", key)
                            .with_context("field", field)
                            .with_hint("the model output overflowed or was NaN for this metric"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Flattened `(explainer, metric, auc)` rows.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.bundles
            .iter()
            .flat_map(|bundle| {
                bundle.metrics.iter().filter_map(move |key| {
                    bundle.get(key).map(|result| SummaryRow {
                        explainer: bundle.name.clone(),
                        metric: key.to_string(),
                        auc: result.auc,
                    })
                })
            })
            .collect()
    }
}

/// One line of the CSV summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Explainer name.
    pub explainer: String,
    /// Metric key, e.g. `remove positive`.
    pub metric: String,
    /// Signed area under the curve.
    pub auc: f64,
}

/// Runs every explainer of `plan`, resolving data paths against `base_dir`.
pub fn run_plan(plan: &BenchmarkPlan, base_dir: &Path) -> Result<BenchmarkReport, BenchError> {
    let plan_hash = plan.plan_hash()?;
    info!(plan = %plan.name, hash = %plan_hash, explainers = plan.explainers.len(), "running benchmark plan");
    let model = plan.model.build();
    let samples = plan.data.load(base_dir)?;
    let masker = plan.masker.build(base_dir)?;
    let options = plan.progress.run_options()?;

    let mut suite =
        BenchmarkSuite::new(&model, &samples, &masker, plan.metrics.clone()).with_options(options);
    for spec in &plan.explainers {
        let source = spec.build(&model, &plan.masker, &masker, base_dir)?;
        match (spec.name(), spec.default_name()) {
            (None, Some(base)) => {
                let name = suite.free_name(base);
                suite.evaluate_named(&source, name)?;
            }
            _ => {
                suite.evaluate(&source)?;
            }
        }
    }
    Ok(BenchmarkReport::from_bundles(
        plan.name.clone(),
        plan_hash,
        suite.into_bundles(),
    ))
}

/// Loads a plan file and runs it relative to the file's directory.
pub fn run_plan_from_path<P: AsRef<Path>>(path: P) -> Result<BenchmarkReport, BenchError> {
    let path = path.as_ref();
    let plan = load_plan(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    run_plan(&plan, base_dir)
}

/// Writes the report as canonical JSON, refusing reports with non-finite
/// values so every written report reads back.
pub fn write_json(report: &BenchmarkReport, path: &Path) -> Result<(), BenchError> {
    report.check_finite()?;
    let bytes = to_canonical_json_bytes(report)?;
    fs::write(path, bytes).map_err(|err| {
        BenchError::Io(
            ErrorInfo::new("report-write", err.to_string()).with_context("path", path.display()),
        )
    })
}

/// Reads a report written by [`write_json`].
pub fn read_json(path: &Path) -> Result<BenchmarkReport, BenchError> {
    let bytes = fs::read(path).map_err(|err| {
        BenchError::Io(
            ErrorInfo::new("report-read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    attrbench_core::from_json_slice(&bytes)
}

/// Writes `explainer,metric,auc` rows as CSV.
pub fn write_summary_csv(report: &BenchmarkReport, path: &Path) -> Result<(), BenchError> {
    let csv_error = |code: &str, err: csv::Error| {
        BenchError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
    };
    let mut writer = csv::Writer::from_path(path).map_err(|err| csv_error("summary-open", err))?;
    for row in report.summary_rows() {
        writer
            .serialize(&row)
            .map_err(|err| csv_error("summary-row", err))?;
    }
    writer.flush().map_err(|err| {
        BenchError::Io(
            ErrorInfo::new("summary-flush", err.to_string()).with_context("path", path.display()),
        )
    })
}
