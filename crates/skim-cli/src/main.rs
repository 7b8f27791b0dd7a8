use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod job;

use commands::{resolve, run};

#[derive(Parser, Debug)]
#[command(
    name = "skim",
    about = "Jet calibration, truth matching and cutflow skimming"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a skimming job over an event file.
    Run(run::RunArgs),
    /// Print the calibration descriptors an era resolves to.
    Resolve(resolve::ResolveArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Resolve(args) => resolve::run(&args),
    }
}
