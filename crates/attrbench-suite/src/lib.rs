#![deny(missing_docs)]
#![doc = "Benchmark orchestration over metric grids, YAML plans, JSON reports and reporting views."]

/// Metric grids, result bundles and the benchmark orchestrator.
pub mod benchmark;
/// YAML benchmark plans.
pub mod plan;
/// Report assembly and persistence.
pub mod report;
pub mod views;

pub use benchmark::{
    evaluate_explainer, BenchmarkSuite, MetricGrid, MetricResult, ResultBundle, RunOptions,
};
pub use plan::{load_plan, BenchmarkPlan, ExplainerSpec, ModelSpec, ProgressSpec};
pub use report::{
    read_json, run_plan, run_plan_from_path, write_json, write_summary_csv, BenchmarkReport,
    SummaryRow,
};
pub use views::{
    comparable_metrics, comparison_view, trend_view, union_metrics, ComparisonRow,
    ComparisonView, TrendPanel, TrendSeries, TrendView, TREND_Y_LABEL,
};
