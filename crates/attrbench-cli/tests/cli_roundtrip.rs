use std::fs::{self, File};
use std::process::Command;

use attrbench_core::{DataSource, MaskerConfig};
use tempfile::tempdir;

const PLAN: &str = r#"
name: cli-smoke
model: { type: linear, weights: [1.0, 1.0] }
data: { inline: [[1.0, 2.0], [2.0, -1.0]] }
masker: { type: constant, fill: 0.0, features: 2 }
explainers:
  - { type: linear }
  - { type: constant, value: 0.5 }
progress: { silent: true }
"#;

fn attrbench() -> Command {
    Command::new(env!("CARGO_BIN_EXE_attrbench"))
}

#[test]
fn run_then_render_views() {
    let tmp = tempdir().unwrap();
    let plan = tmp.path().join("plan.yaml");
    fs::write(&plan, PLAN).unwrap();
    let out = tmp.path().join("out");

    let status = attrbench()
        .arg("run")
        .arg("--plan")
        .arg(&plan)
        .arg("--out")
        .arg(&out)
        .status()
        .expect("run");
    assert!(status.success());
    assert!(out.join("report.json").is_file());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 1 + 2 * 6);

    let trend = attrbench()
        .arg("trend")
        .arg("--report")
        .arg(out.join("report.json"))
        .output()
        .expect("trend");
    assert!(trend.status.success());
    let text = String::from_utf8(trend.stdout).unwrap();
    assert_eq!(text.matches("== ").count(), 6);

    let compare = attrbench()
        .arg("compare")
        .arg("--report")
        .arg(out.join("report.json"))
        .output()
        .expect("compare");
    assert!(compare.status.success());
    let text = String::from_utf8(compare.stdout).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn masker_config_is_saved_tagged() {
    let tmp = tempdir().unwrap();
    let plan = tmp.path().join("plan.yaml");
    fs::write(&plan, PLAN).unwrap();
    let out = tmp.path().join("masker.json");

    let status = attrbench()
        .arg("masker")
        .arg("--plan")
        .arg(&plan)
        .arg("--out")
        .arg(&out)
        .status()
        .expect("masker");
    assert!(status.success());
    let config = MaskerConfig::load(File::open(&out).unwrap()).unwrap();
    assert_eq!(
        config,
        MaskerConfig::Constant {
            fill: 0.0,
            features: 2
        }
    );
}

#[test]
fn saved_masker_points_at_the_plan_directory() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("bg.csv"), "a,b\n0,0\n2,2\n").unwrap();
    let plan = tmp.path().join("plan.yaml");
    fs::write(
        &plan,
        PLAN.replace(
            "{ type: constant, fill: 0.0, features: 2 }",
            "{ type: independent, background: { csv: bg.csv } }",
        ),
    )
    .unwrap();
    let elsewhere = tempdir().unwrap();
    let out = elsewhere.path().join("masker.json");

    let status = attrbench()
        .current_dir(elsewhere.path())
        .arg("masker")
        .arg("--plan")
        .arg(&plan)
        .arg("--out")
        .arg(&out)
        .status()
        .expect("masker");
    assert!(status.success());
    let config = MaskerConfig::load(File::open(&out).unwrap()).unwrap();
    assert_eq!(
        config,
        MaskerConfig::Independent {
            background: DataSource::Csv(tmp.path().join("bg.csv")),
        }
    );
    let adapter = config.build(elsewhere.path()).unwrap();
    assert_eq!(adapter.background().unwrap().column_means(), vec![1.0, 1.0]);
}

#[test]
fn unreadable_plan_fails() {
    let tmp = tempdir().unwrap();
    let status = attrbench()
        .arg("run")
        .arg("--plan")
        .arg(tmp.path().join("missing.yaml"))
        .arg("--out")
        .arg(tmp.path().join("out"))
        .status()
        .expect("run");
    assert!(!status.success());
}
