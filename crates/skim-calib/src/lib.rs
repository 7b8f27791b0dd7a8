#![deny(missing_docs)]

//! Calibration stages applied to jets before selection.
//!
//! Calibration files are not parsed here. Descriptors from the
//! [`CalibrationConfig`] are resolved to file names (run-range `@` and jet-type
//! `&` placeholders) and handed to a [`CalibrationLoader`], which returns
//! opaque providers. The stages only evaluate those providers.

/// B-tag working points and scale-factor lookup.
pub mod btag;
/// In-memory provider tables and the bundle loader.
pub mod bundle;
/// Era and descriptor configuration.
pub mod config;
/// Energy correction chain and uncertainty shift.
pub mod correction;
/// Provider traits and the loader seam.
pub mod provider;
/// Placeholder resolution against run ranges and jet kinds.
pub mod resolve;
/// Resolution smearing with generator-jet matching.
pub mod smearing;
/// Systematic variation names.
pub mod systematic;

pub use btag::{
    BTagCalibration, BTagEntry, BTagProvider, Flavor, WorkingPoint, WorkingPointCuts,
    WorkingPointSf,
};
pub use bundle::{
    BinnedTable, CalibrationBundle, CorrectionTable, ResolutionTable, ScaleFactorTable,
    UncertaintyTable,
};
pub use config::{CalibrationConfig, EraCalibration, RunRange};
pub use correction::EnergyCorrector;
pub use provider::{
    CalibrationLoader, CorrectionLevel, JecUncertainty, JetResolution, ResolutionScaleFactor,
};
pub use resolve::{resolve_descriptor, resolve_run_label, ResolvedDescriptors, RunContext};
pub use smearing::ResolutionSmearer;
pub use systematic::Systematic;
