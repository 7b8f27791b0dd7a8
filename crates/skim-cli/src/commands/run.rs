use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use skim_calib::{CalibrationBundle, CalibrationLoader};
use skim_core::errors::SkimError;
use skim_core::hash::bytes_hash_string;
use skim_core::{stable_hash_string, RngHandle, RunProvenance, SchemaVersion};
use skim_cutflow::CutflowEvaluator;
use skim_jet::JetAnalyzer;
use skim_source::{ColumnarEvent, DataSource, ObjectEvent, ObjectRecord};
use tracing::{debug, info};

use crate::job::{read_file, write_file, Backend, JobConfig};

/// Layout version of `events.jsonl`.
const OUTPUT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML job configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// JSON calibration bundle with materialised provider tables.
    #[arg(long)]
    pub calibration: PathBuf,
    /// JSON array of events in the configured backend layout.
    #[arg(long)]
    pub events: PathBuf,
    /// Output directory for events, cutflow and manifest.
    #[arg(long)]
    pub out: PathBuf,
    /// Write flat output columns instead of structured records.
    #[arg(long)]
    pub columnar: bool,
    /// Override the seed from the job configuration.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Summary of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSummary {
    /// Events read from the input.
    pub events: usize,
    /// Events written to the output.
    pub written: usize,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let summary = execute(args)?;
    info!(
        events = summary.events,
        written = summary.written,
        out = %args.out.display(),
        "job finished"
    );
    Ok(())
}

fn load_events(path: &Path, backend: Backend, is_data: bool) -> Result<Vec<Box<dyn DataSource>>, SkimError> {
    let bytes = read_file(path)?;
    let events = match backend {
        Backend::Columnar => {
            let events: Vec<ColumnarEvent> = skim_core::serde::from_json_slice(&bytes)?;
            for event in &events {
                event.validate(is_data)?;
            }
            events
                .into_iter()
                .map(|event| Box::new(event) as Box<dyn DataSource>)
                .collect()
        }
        Backend::Object => {
            let records: Vec<ObjectRecord> = skim_core::serde::from_json_slice(&bytes)?;
            records
                .into_iter()
                .map(|record| Box::new(ObjectEvent::from(record)) as Box<dyn DataSource>)
                .collect()
        }
    };
    Ok(events)
}

/// Runs the whole job and writes `events.jsonl`, `cutflow.json` and
/// `manifest.json` under the output directory.
pub fn execute(args: &RunArgs) -> Result<JobSummary, SkimError> {
    let mut config = JobConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let era = config.calibration.era(&config.era)?;

    let calibration_bytes = read_file(&args.calibration)?;
    let bundle = CalibrationBundle::from_json_slice(&calibration_bytes)?;
    let loader: Arc<dyn CalibrationLoader> = Arc::new(bundle);

    let mut analyzer = JetAnalyzer::new(
        config.cuts.clone(),
        era,
        config.is_data,
        &config.systematic,
        loader,
    )?;
    let mut cutflow = CutflowEvaluator::new(config.channels.clone())?;
    let events = load_events(&args.events, config.backend, config.is_data)?;
    info!(
        era = %config.era,
        is_data = config.is_data,
        systematic = %config.systematic,
        backend = ?config.backend,
        events = events.len(),
        "starting job"
    );

    let mut lines = Vec::new();
    let mut written = 0;
    for (index, event) in events.iter().enumerate() {
        let source = event.as_ref();
        cutflow.begin_event(analyzer.event_weight(source));
        let mut rng = RngHandle::for_substream(config.seed, index as u64);
        let Some(output) = analyzer.analyze(source, &mut cutflow, &mut rng)? else {
            continue;
        };
        if cutflow.all_rejected() {
            debug!(index, "event failed every channel");
            continue;
        }
        let line = if args.columnar {
            skim_core::serde::to_canonical_json_bytes(&output.to_columns())?
        } else {
            skim_core::serde::to_canonical_json_bytes(&output)?
        };
        lines.extend_from_slice(&line);
        lines.push(b'\n');
        written += 1;
    }

    write_file(&args.out.join("events.jsonl"), &lines)?;
    let report = cutflow.into_report();
    write_file(
        &args.out.join("cutflow.json"),
        skim_core::serde::to_pretty_json(&report)?,
    )?;

    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    let provenance = RunProvenance {
        schema: OUTPUT_SCHEMA,
        config_hash: stable_hash_string(&config)?,
        calibration_hash: bytes_hash_string(&calibration_bytes),
        seed: config.seed,
        systematic: (!config.systematic.is_nominal()).then(|| config.systematic.to_string()),
        created_at: Utc::now().to_rfc3339(),
        tool_versions,
    };
    write_file(
        &args.out.join("manifest.json"),
        skim_core::serde::to_pretty_json(&provenance)?,
    )?;

    Ok(JobSummary {
        events: events.len(),
        written,
    })
}
