use std::env;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use attrbench_suite::load_plan;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct MaskerArgs {
    /// YAML benchmark plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Destination of the tagged masker configuration.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &MaskerArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let plan_dir = env::current_dir()?.join(args.plan.parent().unwrap_or_else(|| Path::new("")));
    plan.masker.resolved(&plan_dir).save(File::create(&args.out)?)?;
    info!(out = %args.out.display(), "masker configuration saved");
    Ok(())
}
