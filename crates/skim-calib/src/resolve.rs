use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use skim_core::{JetKind, PerKind};
use tracing::debug;

use crate::config::EraCalibration;

/// Placeholder replaced by the run-range label.
pub const RUN_PLACEHOLDER: char = '@';
/// Placeholder replaced by the jet kind label.
pub const KIND_PLACEHOLDER: char = '&';

/// Inputs that decide which descriptors apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Whether the job processes collision data.
    pub is_data: bool,
    /// Run number, when known.
    pub run: Option<u32>,
}

/// Every descriptor of an era with placeholders substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDescriptors {
    /// Run-range label selected for data, if any.
    pub run_label: Option<String>,
    /// Correction levels in application order.
    pub jec_levels: PerKind<Vec<String>>,
    /// Uncertainty-source files.
    pub jec_uncertainty: PerKind<String>,
    /// Pt-resolution files.
    pub jer_resolution: PerKind<String>,
    /// Resolution scale-factor files.
    pub jer_scale_factor: PerKind<String>,
    /// B-tag calibration file.
    pub btag_jet: String,
}

/// Returns the label of the run range containing `run`.
pub fn resolve_run_label(era: &EraCalibration, run: u32) -> Option<&str> {
    let label = era
        .run_eras
        .iter()
        .find(|(_, range)| range.contains(run))
        .map(|(label, _)| label.as_str());
    debug!(run, label = label.unwrap_or("-"), "resolved run-range label");
    label
}

/// Substitutes `@` with `run_label` and `&` with the kind label.
///
/// A template that needs `@` without a label is a calibration error.
pub fn resolve_descriptor(
    template: &str,
    run_label: Option<&str>,
    kind: JetKind,
) -> Result<String, SkimError> {
    let mut resolved = template.replace(KIND_PLACEHOLDER, kind.label());
    if resolved.contains(RUN_PLACEHOLDER) {
        let label = run_label.ok_or_else(|| {
            SkimError::Calibration(
                ErrorInfo::new(
                    "unresolved-run-label",
                    format!("descriptor {template} needs a run-range label"),
                )
                .with_context("descriptor", template)
                .with_hint("add a run_eras entry covering the processed runs"),
            )
        })?;
        resolved = resolved.replace(RUN_PLACEHOLDER, label);
    }
    Ok(resolved)
}

impl EraCalibration {
    /// Label used for correction levels in the given context.
    ///
    /// Simulation never carries a label. Data needs a run inside one of the
    /// configured ranges.
    pub fn label_for(&self, context: &RunContext) -> Result<Option<&str>, SkimError> {
        if !context.is_data {
            return Ok(None);
        }
        let Some(run) = context.run else {
            return Ok(None);
        };
        resolve_run_label(self, run).map(Some).ok_or_else(|| {
            SkimError::Calibration(
                ErrorInfo::new("run-outside-eras", format!("run {run} is not in any run range"))
                    .with_context("run", run.to_string()),
            )
        })
    }

    /// Correction-level names for one kind under `run_label`.
    pub fn jec_chain(
        &self,
        is_data: bool,
        run_label: Option<&str>,
        kind: JetKind,
    ) -> Result<Vec<String>, SkimError> {
        self.jec_levels(is_data)
            .iter()
            .map(|template| resolve_descriptor(template, run_label, kind))
            .collect()
    }

    /// Resolves every descriptor, as the driver's dry run prints them.
    pub fn resolve_all(&self, context: &RunContext) -> Result<ResolvedDescriptors, SkimError> {
        let run_label = self.label_for(context)?;
        let per_kind = |template: &str| {
            PerKind::try_build(|kind| resolve_descriptor(template, None, kind))
        };
        Ok(ResolvedDescriptors {
            run_label: run_label.map(str::to_owned),
            jec_levels: PerKind::try_build(|kind| {
                self.jec_chain(context.is_data, run_label, kind)
            })?,
            jec_uncertainty: per_kind(&self.jec_uncertainty)?,
            jer_resolution: per_kind(&self.jer_resolution)?,
            jer_scale_factor: per_kind(&self.jer_scale_factor)?,
            btag_jet: resolve_descriptor(&self.btag_jet, None, JetKind::Ak4)?,
        })
    }
}
