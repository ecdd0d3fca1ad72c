use std::fs;

use attrbench_core::{BenchError, DataSource, MaskerConfig};
use attrbench_suite::{
    load_plan, read_json, run_plan, run_plan_from_path, write_json, write_summary_csv, ExplainerSpec,
};
use tempfile::tempdir;

const PLAN: &str = r#"
name: linear-smoke
metrics:
  sort_order: [positive, absolute]
  perturbation: [remove, keep]
model:
  type: linear
  weights: [1.0, -2.0, 0.5]
  intercept: 0.25
data:
  csv: samples.csv
masker:
  type: independent
  background:
    inline: [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]
explainers:
  - type: linear
  - type: random
    seed: 11
  - type: constant
    value: 1.0
  - type: precomputed
    values:
      inline: [[0.1, 0.2, 0.3], [0.3, 0.2, 0.1], [0.0, 0.0, 1.0]]
progress:
  silent: true
"#;

fn write_fixture(dir: &std::path::Path) -> std::path::PathBuf {
    fs::write(
        dir.join("samples.csv"),
        "a,b,c\n1.0,2.0,3.0\n-1.0,0.5,2.0\n0.0,1.0,0.0\n",
    )
    .unwrap();
    let plan_path = dir.join("plan.yaml");
    fs::write(&plan_path, PLAN).unwrap();
    plan_path
}

#[test]
fn plan_loads_with_tagged_sections() {
    let tmp = tempdir().unwrap();
    let plan = load_plan(write_fixture(tmp.path())).unwrap();
    assert_eq!(plan.name, "linear-smoke");
    assert_eq!(plan.explainers.len(), 4);
    assert_eq!(plan.explainers[0], ExplainerSpec::Linear { name: None });
    assert!(matches!(plan.data, DataSource::Csv(_)));
    assert!(matches!(plan.masker, MaskerConfig::Independent { .. }));
    assert!(plan.progress.silent);
    assert_eq!(plan.progress.threshold_secs, 5.0);

    let yaml = plan.to_yaml_string().unwrap();
    let reparsed: attrbench_suite::BenchmarkPlan =
        attrbench_core::from_yaml_slice(yaml.as_bytes()).unwrap();
    assert_eq!(reparsed, plan);
    assert_eq!(reparsed.plan_hash().unwrap(), plan.plan_hash().unwrap());
}

#[test]
fn report_survives_json_round_trip() {
    let tmp = tempdir().unwrap();
    let plan_path = write_fixture(tmp.path());
    let report = run_plan_from_path(&plan_path).unwrap();

    let names: Vec<&str> = report.bundles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["linear", "random", "constant", "explainer1"]);
    assert_eq!(report.plan_name, "linear-smoke");
    assert_eq!(report.plan_hash, load_plan(&plan_path).unwrap().plan_hash().unwrap());
    assert_eq!(report.trend.panels.len(), 4);
    assert_eq!(report.comparison.metrics.len(), 4);
    assert_eq!(report.comparison.rows.len(), 4);

    let json_path = tmp.path().join("report.json");
    write_json(&report, &json_path).unwrap();
    let restored = read_json(&json_path).unwrap();
    assert_eq!(restored, report);

    // canonical output is byte-stable across writes
    let first = fs::read(&json_path).unwrap();
    write_json(&restored, &json_path).unwrap();
    assert_eq!(fs::read(&json_path).unwrap(), first);
}

#[test]
fn summary_csv_lists_every_metric() {
    let tmp = tempdir().unwrap();
    let report = run_plan_from_path(write_fixture(tmp.path())).unwrap();
    let csv_path = tmp.path().join("summary.csv");
    write_summary_csv(&report, &csv_path).unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("explainer,metric,auc"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 16);
    assert!(rows[0].starts_with("linear,remove positive,"));
}

#[test]
fn missing_data_file_is_an_io_error() {
    let tmp = tempdir().unwrap();
    let plan_path = write_fixture(tmp.path());
    fs::remove_file(tmp.path().join("samples.csv")).unwrap();
    assert!(matches!(
        run_plan_from_path(&plan_path),
        Err(BenchError::Io(_))
    ));
    assert!(matches!(
        load_plan(tmp.path().join("absent.yaml")),
        Err(BenchError::Io(_))
    ));
}

#[test]
fn unnamed_defaults_get_numbered_suffixes() {
    let plan: attrbench_suite::BenchmarkPlan = attrbench_core::from_yaml_slice(
        br#"
name: two-randoms
model:
  type: linear
  weights: [1.0, 2.0]
data:
  inline: [[1.0, 2.0], [0.5, -1.0]]
masker:
  type: independent
  background:
    inline: [[0.0, 0.0]]
explainers:
  - type: random
    seed: 1
  - type: random
    seed: 2
  - type: random
    name: random3
    seed: 5
  - type: random
    seed: 3
progress:
  silent: true
"#,
    )
    .unwrap();
    let tmp = tempdir().unwrap();
    let report = run_plan(&plan, tmp.path()).unwrap();
    let names: Vec<&str> = report.bundles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["random", "random2", "random3", "random4"]);
}
