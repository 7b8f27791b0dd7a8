use std::fmt::Debug;
use std::sync::Arc;

use skim_core::errors::SkimError;
use skim_core::Variation;

use crate::btag::BTagCalibration;

/// One level of the energy-correction chain.
pub trait CorrectionLevel: Debug + Send + Sync {
    /// Multiplicative factor at the given (already partially corrected) pt.
    ///
    /// Implementations return a finite positive value for every input,
    /// including `pt == 0`.
    fn factor(&self, pt: f64, eta: f64, rho: f64, area: f64) -> f64;
}

/// Fractional energy-scale uncertainty of one source.
pub trait JecUncertainty: Debug + Send + Sync {
    /// Non-negative relative uncertainty in the requested direction.
    fn uncertainty(&self, pt: f64, eta: f64, variation: Variation) -> f64;
}

/// Relative pt resolution of simulated jets.
pub trait JetResolution: Debug + Send + Sync {
    /// Relative resolution σ(pt)/pt.
    fn resolution(&self, pt: f64, eta: f64, rho: f64) -> f64;
}

/// Data/simulation resolution ratio.
pub trait ResolutionScaleFactor: Debug + Send + Sync {
    /// Nominal factor for `None`, shifted factor otherwise.
    fn scale_factor(&self, eta: f64, variation: Option<Variation>) -> f64;
}

/// Resolves descriptor names to providers.
///
/// Implementations own the file format; the stages only see the traits above.
/// An unknown name is an error, never a neutral default.
pub trait CalibrationLoader: Send + Sync {
    /// Whether any provider is registered under `name`.
    fn contains(&self, name: &str) -> bool;

    /// Loads one correction level.
    fn correction_level(&self, name: &str) -> Result<Arc<dyn CorrectionLevel>, SkimError>;

    /// Loads one named source from an uncertainty file.
    fn uncertainty(&self, name: &str, source: &str) -> Result<Arc<dyn JecUncertainty>, SkimError>;

    /// Loads a pt-resolution provider.
    fn resolution(&self, name: &str) -> Result<Arc<dyn JetResolution>, SkimError>;

    /// Loads a resolution scale-factor provider.
    fn resolution_scale_factor(
        &self,
        name: &str,
    ) -> Result<Arc<dyn ResolutionScaleFactor>, SkimError>;

    /// Loads a b-tag calibration.
    fn btag(&self, name: &str) -> Result<Arc<BTagCalibration>, SkimError>;
}
