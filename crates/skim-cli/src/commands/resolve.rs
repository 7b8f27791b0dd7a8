use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use skim_calib::RunContext;

use crate::job::JobConfig;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// YAML job configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Run number used to pick the data run label.
    #[arg(long)]
    pub run: Option<u32>,
    /// Override the era from the job configuration.
    #[arg(long)]
    pub era: Option<String>,
}

pub fn run(args: &ResolveArgs) -> Result<(), Box<dyn Error>> {
    let config = JobConfig::load(&args.config)?;
    let era_id = args.era.as_deref().unwrap_or(&config.era);
    let era = config.calibration.era(era_id)?;
    let context = RunContext {
        is_data: config.is_data,
        run: args.run,
    };
    let resolved = era.resolve_all(&context)?;
    println!("{}", skim_core::serde::to_pretty_json(&resolved)?);
    Ok(())
}
