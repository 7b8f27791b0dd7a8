use std::sync::Arc;

use skim_core::errors::{ErrorInfo, SkimError};
use skim_core::{JetKind, LorentzVector, PerKind, Variation};
use tracing::info;

use crate::config::EraCalibration;
use crate::provider::{CalibrationLoader, CorrectionLevel, JecUncertainty};
use crate::resolve::{resolve_descriptor, resolve_run_label, RunContext};
use crate::systematic::Systematic;

/// Smallest factor the uncertainty shift may produce.
const MIN_SHIFT_FACTOR: f64 = 1e-4;

type Chain = Vec<Arc<dyn CorrectionLevel>>;

#[derive(Debug)]
struct LoadedChains {
    run_label: Option<String>,
    last_run: u32,
    chains: PerKind<Chain>,
}

/// Energy-correction stage for both jet kinds.
///
/// Uncertainty providers are loaded at construction. Correction levels
/// depend on the run range for data and are loaded by
/// [`EnergyCorrector::ensure_loaded`], which only reloads when the resolved
/// run-range label changes.
pub struct EnergyCorrector {
    era: EraCalibration,
    is_data: bool,
    loader: Arc<dyn CalibrationLoader>,
    loaded: Option<LoadedChains>,
    shift: Option<(Variation, PerKind<Arc<dyn JecUncertainty>>)>,
}

impl EnergyCorrector {
    /// Builds the stage and checks that every level name the era can resolve
    /// to is known to the loader.
    pub fn new(
        era: &EraCalibration,
        is_data: bool,
        systematic: &Systematic,
        loader: Arc<dyn CalibrationLoader>,
    ) -> Result<Self, SkimError> {
        let labels: Vec<Option<&str>> = if is_data && !era.run_eras.is_empty() {
            era.run_eras.keys().map(|label| Some(label.as_str())).collect()
        } else {
            vec![None]
        };
        for label in labels {
            for kind in JetKind::ALL {
                for name in era.jec_chain(is_data, label, kind)? {
                    if !loader.contains(&name) {
                        return Err(SkimError::Calibration(
                            ErrorInfo::new("missing-descriptor", format!("correction level {name} is not available"))
                                .with_context("descriptor", name)
                                .with_context("kind", kind.label()),
                        ));
                    }
                }
            }
        }

        let shift = match systematic.jec() {
            Some((source, variation)) => {
                let providers = PerKind::try_build(|kind| {
                    let name = resolve_descriptor(&era.jec_uncertainty, None, kind)?;
                    loader.uncertainty(&name, source)
                })?;
                info!(source, ?variation, "energy-scale uncertainty loaded");
                Some((variation, providers))
            }
            None => None,
        };

        Ok(Self {
            era: era.clone(),
            is_data,
            loader,
            loaded: None,
            shift,
        })
    }

    /// Loads the correction levels that apply to `run`. Cheap when nothing
    /// changed since the previous call.
    pub fn ensure_loaded(&mut self, run: u32) -> Result<(), SkimError> {
        if let Some(loaded) = &mut self.loaded {
            if loaded.last_run == run {
                return Ok(());
            }
            if !self.is_data || loaded.run_label.as_deref() == resolve_run_label(&self.era, run) {
                loaded.last_run = run;
                return Ok(());
            }
        }
        let context = RunContext {
            is_data: self.is_data,
            run: Some(run),
        };
        let label = self.era.label_for(&context)?;
        let chains = PerKind::try_build(|kind| {
            self.era
                .jec_chain(self.is_data, label, kind)?
                .iter()
                .map(|name| self.loader.correction_level(name))
                .collect::<Result<Chain, SkimError>>()
        })?;
        info!(run, label = label.unwrap_or("-"), levels = chains.ak4.len(), "correction levels loaded");
        self.loaded = Some(LoadedChains {
            run_label: label.map(str::to_owned),
            last_run: run,
            chains,
        });
        Ok(())
    }

    /// Run-range label of the loaded chain.
    pub fn loaded_label(&self) -> Option<&str> {
        self.loaded.as_ref().and_then(|loaded| loaded.run_label.as_deref())
    }

    /// Product of all levels, each evaluated at the pt corrected by the
    /// previous ones, times `1 ± u` under an energy-scale systematic.
    pub fn correct(
        &self,
        p4: &LorentzVector,
        rho: f64,
        area: f64,
        kind: JetKind,
    ) -> Result<f64, SkimError> {
        let loaded = self.loaded.as_ref().ok_or_else(|| {
            SkimError::Calibration(
                ErrorInfo::new("not-loaded", "correction levels requested before ensure_loaded")
                    .with_context("kind", kind.label()),
            )
        })?;
        let (pt, eta) = (p4.pt(), p4.eta());
        let factor = loaded
            .chains
            .get(kind)
            .iter()
            .fold(1.0, |factor, level| factor * level.factor(pt * factor, eta, rho, area));
        Ok(match &self.shift {
            Some((variation, providers)) => {
                let uncertainty = providers.get(kind).uncertainty(pt * factor, eta, *variation);
                factor * (1.0 + variation.sign() * uncertainty).max(MIN_SHIFT_FACTOR)
            }
            None => factor,
        })
    }
}
