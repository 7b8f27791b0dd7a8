use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};

use crate::btag::WorkingPointCuts;

/// Inclusive run-number range `[first, last]` of a data-taking era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRange(pub u32, pub u32);

impl RunRange {
    /// Whether `run` lies inside the range.
    pub fn contains(&self, run: u32) -> bool {
        self.0 <= run && run <= self.1
    }
}

/// Calibration descriptors for every configured era, keyed by era id
/// (e.g. `"2017"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Per-era descriptor sets.
    #[serde(default)]
    pub eras: BTreeMap<String, EraCalibration>,
}

/// Descriptor set for one era.
///
/// Descriptor strings may contain `@` (replaced by the run-range label the
/// run falls into) and `&` (replaced by the jet kind label `AK4`/`AK8`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EraCalibration {
    /// Run-range labels used to resolve `@`.
    #[serde(default)]
    pub run_eras: BTreeMap<String, RunRange>,
    /// Ordered correction levels for simulation.
    pub jec_mc: Vec<String>,
    /// Ordered correction levels for data (ends with the residual level).
    pub jec_data: Vec<String>,
    /// Uncertainty-source descriptor.
    pub jec_uncertainty: String,
    /// Pt-resolution descriptor.
    pub jer_resolution: String,
    /// Resolution scale-factor descriptor.
    pub jer_scale_factor: String,
    /// B-tag calibration descriptor for narrow jets.
    pub btag_jet: String,
    /// Discriminant thresholds for narrow-jet working points.
    pub btag_cuts: WorkingPointCuts,
}

impl CalibrationConfig {
    /// Returns the descriptor set for `era` or a configuration error.
    pub fn era(&self, era: &str) -> Result<&EraCalibration, SkimError> {
        self.eras.get(era).ok_or_else(|| {
            SkimError::Config(
                ErrorInfo::new("unknown-era", format!("no calibration configured for era {era}"))
                    .with_context("era", era)
                    .with_hint(format!(
                        "configured eras: {}",
                        self.eras.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            )
        })
    }

    /// Parses a YAML configuration.
    pub fn from_yaml_slice(data: &[u8]) -> Result<Self, SkimError> {
        skim_core::serde::from_yaml_slice(data)
    }
}

impl EraCalibration {
    /// Correction levels for data or simulation.
    pub fn jec_levels(&self, is_data: bool) -> &[String] {
        if is_data {
            &self.jec_data
        } else {
            &self.jec_mc
        }
    }
}
