//! Selection and association settings of the jet analyzer.

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};

/// Kinematic cuts, truth targets and association radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JetAnalyzerConfig {
    /// Minimum corrected narrow-jet pt.
    #[serde(default = "JetAnalyzerConfig::default_jet_pt_min")]
    pub jet_pt_min: f64,
    /// Maximum narrow-jet |eta|.
    #[serde(default = "JetAnalyzerConfig::default_eta_max")]
    pub jet_eta_max: f64,
    /// Minimum corrected fat-jet pt.
    #[serde(default = "JetAnalyzerConfig::default_fat_jet_pt_min")]
    pub fat_jet_pt_min: f64,
    /// Minimum corrected fat-jet mass.
    #[serde(default = "JetAnalyzerConfig::default_fat_jet_mass_min")]
    pub fat_jet_mass_min: f64,
    /// Maximum fat-jet |eta|.
    #[serde(default = "JetAnalyzerConfig::default_eta_max")]
    pub fat_jet_eta_max: f64,
    /// Parton species looked for behind narrow jets.
    #[serde(default = "JetAnalyzerConfig::default_jet_truth_target")]
    pub jet_truth_target: i32,
    /// Parton species looked for behind fat jets.
    #[serde(default = "JetAnalyzerConfig::default_fat_jet_truth_target")]
    pub fat_jet_truth_target: i32,
    /// Narrow jets closer than this to an accepted fat jet are subjets.
    #[serde(default = "JetAnalyzerConfig::default_association_radius")]
    pub association_radius: f64,
    /// Secondary vertices closer than this belong to a fat jet.
    #[serde(default = "JetAnalyzerConfig::default_vertex_radius")]
    pub vertex_radius: f64,
}

impl JetAnalyzerConfig {
    fn default_jet_pt_min() -> f64 {
        30.0
    }
    fn default_eta_max() -> f64 {
        2.4
    }
    fn default_fat_jet_pt_min() -> f64 {
        170.0
    }
    fn default_fat_jet_mass_min() -> f64 {
        40.0
    }
    fn default_jet_truth_target() -> i32 {
        6
    }
    fn default_fat_jet_truth_target() -> i32 {
        5
    }
    fn default_association_radius() -> f64 {
        1.2
    }
    fn default_vertex_radius() -> f64 {
        0.8
    }

    /// Rejects non-finite or negative cuts and radii.
    pub fn validate(&self) -> Result<(), SkimError> {
        let values = [
            ("jet_pt_min", self.jet_pt_min),
            ("jet_eta_max", self.jet_eta_max),
            ("fat_jet_pt_min", self.fat_jet_pt_min),
            ("fat_jet_mass_min", self.fat_jet_mass_min),
            ("fat_jet_eta_max", self.fat_jet_eta_max),
            ("association_radius", self.association_radius),
            ("vertex_radius", self.vertex_radius),
        ];
        for (name, value) in values {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SkimError::Config(
                    ErrorInfo::new("invalid-cut", format!("{name} must be finite and non-negative"))
                        .with_context("field", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(())
    }
}

impl Default for JetAnalyzerConfig {
    fn default() -> Self {
        Self {
            jet_pt_min: Self::default_jet_pt_min(),
            jet_eta_max: Self::default_eta_max(),
            fat_jet_pt_min: Self::default_fat_jet_pt_min(),
            fat_jet_mass_min: Self::default_fat_jet_mass_min(),
            fat_jet_eta_max: Self::default_eta_max(),
            jet_truth_target: Self::default_jet_truth_target(),
            fat_jet_truth_target: Self::default_fat_jet_truth_target(),
            association_radius: Self::default_association_radius(),
            vertex_radius: Self::default_vertex_radius(),
        }
    }
}
