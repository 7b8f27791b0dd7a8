use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use skim_core::Variation;
use tracing::info;

use crate::btag::BTagCalibration;
use crate::provider::{
    CalibrationLoader, CorrectionLevel, JecUncertainty, JetResolution, ResolutionScaleFactor,
};

/// Smallest factor a correction level may return.
pub const DEFAULT_FLOOR: f64 = 1e-4;

fn default_floor() -> f64 {
    DEFAULT_FLOOR
}

fn default_pt_range() -> [f64; 2] {
    [10.0, 6500.0]
}

fn malformed(name: &str, message: impl Into<String>) -> SkimError {
    SkimError::Calibration(ErrorInfo::new("malformed-table", message).with_context("table", name))
}

fn missing(kind: &str, name: &str) -> SkimError {
    SkimError::Calibration(
        ErrorInfo::new("missing-descriptor", format!("no {kind} registered as {name}"))
            .with_context("descriptor", name)
            .with_hint("check the descriptor templates of the era against the bundle"),
    )
}

/// Bin containing `x`, with values outside the edges clamped to the first or
/// last bin. NaN lands in the first bin.
fn bin_index(edges: &[f64], x: f64) -> usize {
    let bins = edges.len().saturating_sub(1);
    if bins <= 1 {
        return 0;
    }
    let above = edges[1..bins].partition_point(|edge| *edge <= x);
    above.min(bins - 1)
}

fn check_edges(name: &str, axis: &str, edges: &[f64]) -> Result<usize, SkimError> {
    if edges.len() < 2 || edges.windows(2).any(|pair| !(pair[0] < pair[1])) {
        return Err(malformed(name, format!("{axis} edges must be strictly increasing")));
    }
    Ok(edges.len() - 1)
}

/// Values on an eta × pt grid, row-major in eta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinnedTable {
    /// Eta bin edges.
    pub eta_edges: Vec<f64>,
    /// Pt bin edges.
    pub pt_edges: Vec<f64>,
    /// One value per (eta, pt) bin.
    pub values: Vec<f64>,
    /// Bin in |eta| rather than signed eta.
    #[serde(default)]
    pub abs_eta: bool,
}

impl BinnedTable {
    /// Value of the bin containing (eta, pt), clamped to the grid.
    pub fn lookup(&self, eta: f64, pt: f64) -> f64 {
        let eta = if self.abs_eta { eta.abs() } else { eta };
        let pt_bins = self.pt_edges.len().saturating_sub(1).max(1);
        let idx = bin_index(&self.eta_edges, eta) * pt_bins + bin_index(&self.pt_edges, pt);
        self.values.get(idx).copied().unwrap_or(f64::NAN)
    }

    fn validate(&self, name: &str) -> Result<(), SkimError> {
        let expected = check_edges(name, "eta", &self.eta_edges)?
            * check_edges(name, "pt", &self.pt_edges)?;
        if self.values.len() != expected {
            return Err(malformed(
                name,
                format!("expected {expected} values, found {}", self.values.len()),
            ));
        }
        Ok(())
    }
}

/// One correction level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionTable {
    /// Pileup offset: `1 - rho · area · offset(eta) / pt`.
    PileupOffset {
        /// Eta bin edges.
        eta_edges: Vec<f64>,
        /// Offset density per eta bin.
        offset: Vec<f64>,
        /// Smallest returned factor.
        #[serde(default = "default_floor")]
        floor: f64,
    },
    /// Factor read from an eta × pt grid (relative, absolute, residual).
    Binned {
        /// Factor grid.
        table: BinnedTable,
        /// Smallest returned factor.
        #[serde(default = "default_floor")]
        floor: f64,
    },
}

impl CorrectionTable {
    fn validate(&self, name: &str) -> Result<(), SkimError> {
        match self {
            CorrectionTable::PileupOffset { eta_edges, offset, floor } => {
                let bins = check_edges(name, "eta", eta_edges)?;
                if offset.len() != bins {
                    return Err(malformed(name, "one offset per eta bin expected"));
                }
                check_floor(name, *floor)
            }
            CorrectionTable::Binned { table, floor } => {
                table.validate(name)?;
                check_floor(name, *floor)
            }
        }
    }
}

fn check_floor(name: &str, floor: f64) -> Result<(), SkimError> {
    if floor > 0.0 && floor.is_finite() {
        Ok(())
    } else {
        Err(malformed(name, "floor must be finite and positive"))
    }
}

impl CorrectionLevel for CorrectionTable {
    fn factor(&self, pt: f64, eta: f64, rho: f64, area: f64) -> f64 {
        let (raw, floor) = match self {
            CorrectionTable::PileupOffset { eta_edges, offset, floor } => {
                let density = offset.get(bin_index(eta_edges, eta)).copied().unwrap_or(0.0);
                (1.0 - rho * area * density / pt, *floor)
            }
            CorrectionTable::Binned { table, floor } => (table.lookup(eta, pt), *floor),
        };
        if raw.is_finite() {
            raw.max(floor)
        } else {
            floor
        }
    }
}

/// Up and down uncertainty grids of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyTable {
    /// Upward relative uncertainty.
    pub up: BinnedTable,
    /// Downward relative uncertainty.
    pub down: BinnedTable,
}

impl JecUncertainty for UncertaintyTable {
    fn uncertainty(&self, pt: f64, eta: f64, variation: Variation) -> f64 {
        let value = match variation {
            Variation::Up => self.up.lookup(eta, pt),
            Variation::Down => self.down.lookup(eta, pt),
        };
        if value.is_finite() {
            value.abs()
        } else {
            0.0
        }
    }
}

/// Parametrised resolution `sqrt(N·|N|/pt² + S²/pt + C²)` per (eta, rho) bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTable {
    /// Eta bin edges.
    pub eta_edges: Vec<f64>,
    /// Rho bin edges.
    pub rho_edges: Vec<f64>,
    /// `[N, S, C]` per bin, row-major in eta.
    pub parameters: Vec<[f64; 3]>,
    /// Pt range the parametrisation is valid in.
    #[serde(default = "default_pt_range")]
    pub pt_range: [f64; 2],
}

impl JetResolution for ResolutionTable {
    fn resolution(&self, pt: f64, eta: f64, rho: f64) -> f64 {
        let rho_bins = self.rho_edges.len().saturating_sub(1).max(1);
        let idx = bin_index(&self.eta_edges, eta) * rho_bins + bin_index(&self.rho_edges, rho);
        let Some([n, s, c]) = self.parameters.get(idx).copied() else {
            return 0.0;
        };
        let pt = pt.max(self.pt_range[0]).min(self.pt_range[1]);
        let sigma = (n * n.abs() / (pt * pt) + s * s / pt + c * c).max(0.0).sqrt();
        if sigma.is_finite() {
            sigma
        } else {
            0.0
        }
    }
}

impl ResolutionTable {
    fn validate(&self, name: &str) -> Result<(), SkimError> {
        let expected = check_edges(name, "eta", &self.eta_edges)?
            * check_edges(name, "rho", &self.rho_edges)?;
        if self.parameters.len() != expected {
            return Err(malformed(name, format!("expected {expected} parameter sets")));
        }
        if !(0.0 < self.pt_range[0] && self.pt_range[0] < self.pt_range[1]) {
            return Err(malformed(name, "pt range must be positive and increasing"));
        }
        Ok(())
    }
}

/// Resolution scale factors per eta bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactorTable {
    /// Eta bin edges.
    pub eta_edges: Vec<f64>,
    /// Nominal factors.
    pub nominal: Vec<f64>,
    /// Upward-shifted factors.
    pub up: Vec<f64>,
    /// Downward-shifted factors.
    pub down: Vec<f64>,
    /// Bin in |eta| rather than signed eta.
    #[serde(default)]
    pub abs_eta: bool,
}

impl ResolutionScaleFactor for ScaleFactorTable {
    fn scale_factor(&self, eta: f64, variation: Option<Variation>) -> f64 {
        let eta = if self.abs_eta { eta.abs() } else { eta };
        let column = match variation {
            None => &self.nominal,
            Some(Variation::Up) => &self.up,
            Some(Variation::Down) => &self.down,
        };
        column.get(bin_index(&self.eta_edges, eta)).copied().unwrap_or(1.0)
    }
}

impl ScaleFactorTable {
    fn validate(&self, name: &str) -> Result<(), SkimError> {
        let bins = check_edges(name, "eta", &self.eta_edges)?;
        if [&self.nominal, &self.up, &self.down].iter().any(|column| column.len() != bins) {
            return Err(malformed(name, "one factor per eta bin expected"));
        }
        Ok(())
    }
}

/// Every table of a job, keyed by resolved descriptor name.
///
/// The bundle is validated as a whole when it is read, so lookups on the
/// providers it hands out never index out of range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationBundle {
    /// Correction levels.
    #[serde(default)]
    pub corrections: BTreeMap<String, CorrectionTable>,
    /// Uncertainty files, each holding named sources.
    #[serde(default)]
    pub uncertainties: BTreeMap<String, BTreeMap<String, UncertaintyTable>>,
    /// Pt-resolution tables.
    #[serde(default)]
    pub resolutions: BTreeMap<String, ResolutionTable>,
    /// Resolution scale-factor tables.
    #[serde(default)]
    pub scale_factors: BTreeMap<String, ScaleFactorTable>,
    /// B-tag calibrations.
    #[serde(default)]
    pub btag: BTreeMap<String, BTagCalibration>,
}

impl CalibrationBundle {
    /// Reads and validates a JSON bundle.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, SkimError> {
        let bundle: Self = skim_core::serde::from_json_slice(data)?;
        bundle.validate()?;
        info!(
            corrections = bundle.corrections.len(),
            uncertainties = bundle.uncertainties.len(),
            resolutions = bundle.resolutions.len(),
            scale_factors = bundle.scale_factors.len(),
            btag = bundle.btag.len(),
            "calibration bundle loaded"
        );
        Ok(bundle)
    }

    /// Checks every table's shape.
    pub fn validate(&self) -> Result<(), SkimError> {
        for (name, table) in &self.corrections {
            table.validate(name)?;
        }
        for (name, sources) in &self.uncertainties {
            for table in sources.values() {
                table.up.validate(name)?;
                table.down.validate(name)?;
            }
        }
        for (name, table) in &self.resolutions {
            table.validate(name)?;
        }
        for (name, table) in &self.scale_factors {
            table.validate(name)?;
        }
        for (name, calibration) in &self.btag {
            calibration.validate(name)?;
        }
        Ok(())
    }
}

impl CalibrationLoader for CalibrationBundle {
    fn contains(&self, name: &str) -> bool {
        self.corrections.contains_key(name)
            || self.uncertainties.contains_key(name)
            || self.resolutions.contains_key(name)
            || self.scale_factors.contains_key(name)
            || self.btag.contains_key(name)
    }

    fn correction_level(&self, name: &str) -> Result<Arc<dyn CorrectionLevel>, SkimError> {
        let table = self.corrections.get(name).ok_or_else(|| missing("correction level", name))?;
        Ok(Arc::new(table.clone()))
    }

    fn uncertainty(&self, name: &str, source: &str) -> Result<Arc<dyn JecUncertainty>, SkimError> {
        let sources = self.uncertainties.get(name).ok_or_else(|| missing("uncertainty file", name))?;
        let table = sources.get(source).ok_or_else(|| {
            SkimError::Calibration(
                ErrorInfo::new("missing-source", format!("{name} has no source {source}"))
                    .with_context("descriptor", name)
                    .with_context("source", source)
                    .with_hint(format!(
                        "available sources: {}",
                        sources.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            )
        })?;
        Ok(Arc::new(table.clone()))
    }

    fn resolution(&self, name: &str) -> Result<Arc<dyn JetResolution>, SkimError> {
        let table = self.resolutions.get(name).ok_or_else(|| missing("resolution", name))?;
        Ok(Arc::new(table.clone()))
    }

    fn resolution_scale_factor(
        &self,
        name: &str,
    ) -> Result<Arc<dyn ResolutionScaleFactor>, SkimError> {
        let table = self
            .scale_factors
            .get(name)
            .ok_or_else(|| missing("resolution scale factor", name))?;
        Ok(Arc::new(table.clone()))
    }

    fn btag(&self, name: &str) -> Result<Arc<BTagCalibration>, SkimError> {
        let calibration = self.btag.get(name).ok_or_else(|| missing("b-tag calibration", name))?;
        Ok(Arc::new(calibration.clone()))
    }
}
