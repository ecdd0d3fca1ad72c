use std::error::Error;
use std::fs;
use std::path::PathBuf;

use attrbench_suite::{run_plan_from_path, write_json, write_summary_csv};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML benchmark plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory for `report.json` and `summary.csv`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let report = run_plan_from_path(&args.plan)?;
    write_json(&report, &args.out.join("report.json"))?;
    write_summary_csv(&report, &args.out.join("summary.csv"))?;
    info!(
        out = %args.out.display(),
        bundles = report.bundles.len(),
        "report written"
    );
    Ok(())
}
