//! YAML job configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skim_calib::{CalibrationConfig, Systematic};
use skim_core::errors::{ErrorInfo, SkimError};
use skim_cutflow::ChannelConfig;
use skim_jet::JetAnalyzerConfig;

/// Event backend the input file is decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Named flat arrays per event.
    #[default]
    Columnar,
    /// Typed object collections per event.
    Object,
}

/// Complete description of one skimming job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Era identifier looked up in `calibration.eras`.
    pub era: String,
    /// Whether the input is collision data.
    #[serde(default)]
    pub is_data: bool,
    /// Systematic variation processed by the job.
    #[serde(default)]
    pub systematic: Systematic,
    /// Master seed from which per-event smearing substreams are derived.
    #[serde(default = "JobConfig::default_seed")]
    pub seed: u64,
    /// Input backend.
    #[serde(default)]
    pub backend: Backend,
    /// Kinematic selection.
    #[serde(default)]
    pub cuts: JetAnalyzerConfig,
    /// Cutflow channels.
    pub channels: Vec<ChannelConfig>,
    /// Calibration descriptors per era.
    pub calibration: CalibrationConfig,
}

impl JobConfig {
    fn default_seed() -> u64 {
        0x5eed
    }

    /// Reads and parses a job file.
    pub fn load(path: &Path) -> Result<Self, SkimError> {
        let bytes = read_file(path)?;
        skim_core::serde::from_yaml_slice(&bytes)
    }
}

/// Reads a file, mapping failures onto [`SkimError::Io`].
pub fn read_file(path: &Path) -> Result<Vec<u8>, SkimError> {
    std::fs::read(path).map_err(|err| {
        SkimError::Io(
            ErrorInfo::new("read-failed", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Writes a file, creating parent directories, mapping failures onto
/// [`SkimError::Io`].
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), SkimError> {
    let io_error = |err: std::io::Error| {
        SkimError::Io(
            ErrorInfo::new("write-failed", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}
