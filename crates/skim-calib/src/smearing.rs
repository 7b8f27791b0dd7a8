use std::sync::Arc;

use rand_distr::{Distribution, Normal};
use skim_core::errors::SkimError;
use skim_core::{JetKind, LorentzVector, PerKind, RngHandle, Variation};
use tracing::info;

use crate::config::EraCalibration;
use crate::provider::{CalibrationLoader, JetResolution, ResolutionScaleFactor};
use crate::resolve::resolve_descriptor;
use crate::systematic::Systematic;

/// Smallest pt a smeared jet may end up with.
pub const MIN_SMEARED_PT: f64 = 0.01;

/// A generator jet is a match when its pt lies within this many resolutions.
const MATCH_RESOLUTIONS: f64 = 3.0;

#[derive(Debug, Clone)]
struct KindProviders {
    resolution: Arc<dyn JetResolution>,
    scale_factor: Arc<dyn ResolutionScaleFactor>,
}

/// Resolution smearing for simulated jets.
///
/// Every call to [`ResolutionSmearer::smear`] replaces the cached generator
/// match for that jet kind; the truth labelling reads it right after.
#[derive(Debug, Clone)]
pub struct ResolutionSmearer {
    providers: PerKind<KindProviders>,
    variation: Option<Variation>,
    matched: PerKind<Option<LorentzVector>>,
}

impl ResolutionSmearer {
    /// Loads resolution and scale-factor providers for both kinds.
    pub fn new(
        era: &EraCalibration,
        systematic: &Systematic,
        loader: &dyn CalibrationLoader,
    ) -> Result<Self, SkimError> {
        let providers = PerKind::try_build(|kind| {
            Ok::<_, SkimError>(KindProviders {
                resolution: loader.resolution(&resolve_descriptor(&era.jer_resolution, None, kind)?)?,
                scale_factor: loader
                    .resolution_scale_factor(&resolve_descriptor(&era.jer_scale_factor, None, kind)?)?,
            })
        })?;
        let variation = systematic.jer();
        info!(?variation, "resolution providers loaded");
        Ok(Self {
            providers,
            variation,
            matched: PerKind::default(),
        })
    }

    /// Forgets the cached matches; called at the start of every event.
    pub fn reset(&mut self) {
        self.matched = PerKind::default();
    }

    /// Generator jet matched by the latest call for `kind`.
    pub fn matched_gen_jet(&self, kind: JetKind) -> Option<&LorentzVector> {
        self.matched.get(kind).as_ref()
    }

    /// Returns the factor the jet four-momentum is multiplied with.
    ///
    /// A generator jet within `cone / 2` whose pt agrees within three
    /// resolutions scales the difference by the scale factor. Without a
    /// match and a scale factor above one a Gaussian term is drawn from
    /// `rng`. The result never takes the jet below [`MIN_SMEARED_PT`].
    pub fn smear(
        &mut self,
        p4: &LorentzVector,
        rho: f64,
        cone: f64,
        kind: JetKind,
        gen_jets: &[LorentzVector],
        rng: &mut RngHandle,
    ) -> f64 {
        let providers = self.providers.get(kind);
        let pt = p4.pt();
        let resolution = providers.resolution.resolution(pt, p4.eta(), rho);
        let scale = providers.scale_factor.scale_factor(p4.eta(), self.variation);

        let matched = gen_jets
            .iter()
            .find(|candidate| {
                p4.delta_r(candidate) < cone / 2.0
                    && (pt - candidate.pt()).abs() < MATCH_RESOLUTIONS * resolution * pt
            })
            .copied();
        *self.matched.get_mut(kind) = matched;

        if pt.is_nan() || pt <= 0.0 {
            return 1.0;
        }
        let factor = match matched {
            Some(truth) => 1.0 + (scale - 1.0) * (pt - truth.pt()) / pt,
            None if scale > 1.0 => {
                let width = resolution * (scale * scale - 1.0).sqrt();
                match Normal::new(0.0, width) {
                    Ok(normal) => 1.0 + normal.sample(rng),
                    Err(_) => 1.0,
                }
            }
            None => 1.0,
        };
        if pt * factor < MIN_SMEARED_PT || !factor.is_finite() {
            MIN_SMEARED_PT / pt
        } else {
            factor
        }
    }
}
