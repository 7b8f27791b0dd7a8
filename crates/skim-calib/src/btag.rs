use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use skim_core::Variation;
use tracing::debug;

/// Distance kept from the upper edge when clamping into the valid domain,
/// since bins are half-open.
const UPPER_EDGE_MARGIN: f64 = 1e-4;

/// B-tag working point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingPoint {
    /// Loose.
    Loose,
    /// Medium.
    Medium,
    /// Tight.
    Tight,
}

impl WorkingPoint {
    /// All working points, loosest first.
    pub const ALL: [WorkingPoint; 3] = [WorkingPoint::Loose, WorkingPoint::Medium, WorkingPoint::Tight];

    /// Label used in output column names.
    pub fn label(&self) -> &'static str {
        match self {
            WorkingPoint::Loose => "Loose",
            WorkingPoint::Medium => "Medium",
            WorkingPoint::Tight => "Tight",
        }
    }
}

/// Hadron flavour a scale factor applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Bottom.
    B,
    /// Charm.
    C,
    /// Light quarks and gluons.
    Udsg,
}

/// Discriminant thresholds per working point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingPointCuts {
    /// Loose threshold.
    pub loose: f64,
    /// Medium threshold.
    pub medium: f64,
    /// Tight threshold.
    pub tight: f64,
}

impl WorkingPointCuts {
    /// Threshold of `wp`.
    pub fn cut(&self, wp: WorkingPoint) -> f64 {
        match wp {
            WorkingPoint::Loose => self.loose,
            WorkingPoint::Medium => self.medium,
            WorkingPoint::Tight => self.tight,
        }
    }

    /// `threshold < discriminant`.
    pub fn passes(&self, wp: WorkingPoint, discriminant: f64) -> bool {
        self.cut(wp) < discriminant
    }
}

/// One rectangular (|eta|, pt) bin of a calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BTagEntry {
    /// Working point.
    pub working_point: WorkingPoint,
    /// Flavour.
    pub flavor: Flavor,
    /// Shift direction, absent for the central value.
    #[serde(default)]
    pub variation: Option<Variation>,
    /// Lower |eta| edge (inclusive).
    pub eta_min: f64,
    /// Upper |eta| edge (exclusive).
    pub eta_max: f64,
    /// Lower pt edge (inclusive).
    pub pt_min: f64,
    /// Upper pt edge (exclusive).
    pub pt_max: f64,
    /// Scale factor in the bin.
    pub value: f64,
}

impl BTagEntry {
    fn selects(&self, wp: WorkingPoint, flavor: Flavor, variation: Option<Variation>) -> bool {
        self.working_point == wp && self.flavor == flavor && self.variation == variation
    }

    fn covers(&self, abs_eta: f64, pt: f64) -> bool {
        self.eta_min <= abs_eta && abs_eta < self.eta_max && self.pt_min <= pt && pt < self.pt_max
    }
}

/// Scale-factor calibration for one tagger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BTagCalibration {
    /// Calibration bins.
    pub entries: Vec<BTagEntry>,
}

fn clamp_into(x: f64, lower: f64, upper: f64) -> f64 {
    let upper = (upper - UPPER_EDGE_MARGIN).max(lower);
    if x.is_nan() {
        return lower;
    }
    x.max(lower).min(upper)
}

impl BTagCalibration {
    fn selected(
        &self,
        wp: WorkingPoint,
        flavor: Flavor,
        variation: Option<Variation>,
    ) -> impl Iterator<Item = &BTagEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.selects(wp, flavor, variation))
    }

    /// Whether any bin exists for the selection.
    pub fn has_entries(&self, wp: WorkingPoint, flavor: Flavor, variation: Option<Variation>) -> bool {
        self.selected(wp, flavor, variation).next().is_some()
    }

    /// Scale factor with |eta| and pt clamped to the domain covered by the
    /// selected bins. Returns 1 when nothing is selected or the clamped point
    /// falls in a gap between bins.
    pub fn lookup(
        &self,
        wp: WorkingPoint,
        flavor: Flavor,
        abs_eta: f64,
        pt: f64,
        variation: Option<Variation>,
    ) -> f64 {
        let selected = || self.selected(wp, flavor, variation);
        let Some(first) = selected().next() else {
            return 1.0;
        };
        let init = (first.eta_min, first.eta_max, first.pt_min, first.pt_max);
        let (eta_lo, eta_hi, pt_lo, pt_hi) = selected().fold(init, |acc, entry| {
            (
                acc.0.min(entry.eta_min),
                acc.1.max(entry.eta_max),
                acc.2.min(entry.pt_min),
                acc.3.max(entry.pt_max),
            )
        });
        let abs_eta = clamp_into(abs_eta.abs(), eta_lo, eta_hi);
        let pt = clamp_into(pt, pt_lo, pt_hi);
        match selected().find(|entry| entry.covers(abs_eta, pt)) {
            Some(entry) => entry.value,
            None => {
                debug!(?wp, ?flavor, abs_eta, pt, "no b-tag bin covers the point");
                1.0
            }
        }
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), SkimError> {
        let bad = self.entries.iter().position(|entry| {
            !(entry.eta_min < entry.eta_max && entry.pt_min < entry.pt_max && entry.value.is_finite())
        });
        match bad {
            Some(index) => Err(SkimError::Calibration(
                ErrorInfo::new("malformed-table", "b-tag bin with empty range or non-finite value")
                    .with_context("table", name)
                    .with_context("entry", index.to_string()),
            )),
            None => Ok(()),
        }
    }
}

/// Central value and optional shifts at one working point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingPointSf {
    /// Central scale factor.
    pub central: f64,
    /// Upward shift, when variations are computed.
    pub up: Option<f64>,
    /// Downward shift, when variations are computed.
    pub down: Option<f64>,
}

/// Scale-factor provider bound to one flavour and one set of thresholds.
#[derive(Debug, Clone)]
pub struct BTagProvider {
    calibration: Arc<BTagCalibration>,
    cuts: WorkingPointCuts,
    flavor: Flavor,
    with_variations: bool,
}

impl BTagProvider {
    /// Builds the provider, requiring central bins for every working point
    /// and shifted bins when variations are requested.
    pub fn new(
        calibration: Arc<BTagCalibration>,
        cuts: WorkingPointCuts,
        flavor: Flavor,
        with_variations: bool,
    ) -> Result<Self, SkimError> {
        let mut needed = vec![None];
        if with_variations {
            needed.extend([Some(Variation::Up), Some(Variation::Down)]);
        }
        for wp in WorkingPoint::ALL {
            for variation in &needed {
                if !calibration.has_entries(wp, flavor, *variation) {
                    return Err(SkimError::Config(
                        ErrorInfo::new(
                            "missing-working-point",
                            format!("no b-tag bins for working point {}", wp.label()),
                        )
                        .with_context("working_point", wp.label())
                        .with_context("variation", format!("{variation:?}")),
                    ));
                }
            }
        }
        Ok(Self {
            calibration,
            cuts,
            flavor,
            with_variations,
        })
    }

    /// Discriminant thresholds.
    pub fn cuts(&self) -> &WorkingPointCuts {
        &self.cuts
    }

    /// Whether up/down shifts are evaluated.
    pub fn with_variations(&self) -> bool {
        self.with_variations
    }

    /// Scale factor for the provider's flavour.
    pub fn lookup(&self, wp: WorkingPoint, abs_eta: f64, pt: f64, variation: Option<Variation>) -> f64 {
        self.calibration.lookup(wp, self.flavor, abs_eta, pt, variation)
    }

    /// Central value plus shifts when enabled.
    pub fn scale_factors(&self, wp: WorkingPoint, abs_eta: f64, pt: f64) -> WorkingPointSf {
        let shifted = |variation| {
            self.with_variations
                .then(|| self.lookup(wp, abs_eta, pt, Some(variation)))
        };
        WorkingPointSf {
            central: self.lookup(wp, abs_eta, pt, None),
            up: shifted(Variation::Up),
            down: shifted(Variation::Down),
        }
    }
}
