//! Structured per-event output and its columnar view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skim_calib::{WorkingPoint, WorkingPointSf};
use skim_core::LorentzVector;
use skim_truth::OriginLabel;

/// B-tag scale factors of one jet at every working point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BTagScaleFactors {
    /// Loose working point.
    pub loose: WorkingPointSf,
    /// Medium working point.
    pub medium: WorkingPointSf,
    /// Tight working point.
    pub tight: WorkingPointSf,
}

impl BTagScaleFactors {
    /// Factors of `wp`.
    pub fn get(&self, wp: WorkingPoint) -> &WorkingPointSf {
        match wp {
            WorkingPoint::Loose => &self.loose,
            WorkingPoint::Medium => &self.medium,
            WorkingPoint::Tight => &self.tight,
        }
    }
}

/// Accepted narrow jet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JetOutput {
    /// Corrected and smeared four-momentum.
    pub p4: LorentzVector,
    /// Passes the loose discriminant threshold.
    pub is_loose_b: bool,
    /// Passes the medium discriminant threshold.
    pub is_medium_b: bool,
    /// Passes the tight discriminant threshold.
    pub is_tight_b: bool,
    /// Scale factors, simulation only.
    pub btag_sf: Option<BTagScaleFactors>,
    /// Truth origin, simulation only.
    pub origin: Option<OriginLabel>,
    /// Output index of the fat jet this jet lies in, `-1` when none.
    pub fat_jet_index: i32,
}

/// Accepted fat jet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatJetOutput {
    /// Corrected and smeared four-momentum.
    pub p4: LorentzVector,
    /// N-subjettiness τ1, τ2, τ3.
    pub njettiness: [f64; 3],
    /// `hbb / (hbb + top)`, 0 when both vanish.
    pub top_vs_higgs: f64,
    /// Hbb-versus-QCD discriminant.
    pub qcd_vs_higgs: f64,
    /// Truth origin, simulation only.
    pub origin: Option<OriginLabel>,
}

/// Particle-flow constituent of an accepted fat jet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentOutput {
    /// Four-momentum as read.
    pub p4: LorentzVector,
    /// Production vertex.
    pub vertex: [f64; 3],
    /// Electric charge.
    pub charge: f64,
    /// Output index of the owning fat jet.
    pub fat_jet_index: usize,
}

/// Secondary vertex near an accepted fat jet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexOutput {
    /// Vertex four-momentum.
    pub p4: LorentzVector,
    /// Vertex position.
    pub position: [f64; 3],
    /// Output index of the fat jet.
    pub fat_jet_index: usize,
}

/// Everything the analyzer produces for one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JetEventOutput {
    /// Run number.
    pub run: u32,
    /// Accepted narrow jets.
    pub jets: Vec<JetOutput>,
    /// Accepted fat jets.
    pub fat_jets: Vec<FatJetOutput>,
    /// Constituents of accepted fat jets.
    pub constituents: Vec<ConstituentOutput>,
    /// Secondary vertices near accepted fat jets.
    pub vertices: Vec<VertexOutput>,
    /// Number of accepted narrow jets associated with a fat jet.
    pub subjets: usize,
    /// MET x component after jet propagation.
    pub met_px: f64,
    /// MET y component after jet propagation.
    pub met_py: f64,
    /// Scalar sum of accepted narrow-jet pt.
    pub ht: f64,
}

/// Named columns of one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputColumns {
    /// Per-object floating-point columns.
    pub floats: BTreeMap<String, Vec<f64>>,
    /// Per-object flag columns.
    pub flags: BTreeMap<String, Vec<bool>>,
    /// Per-event scalars.
    pub scalars: BTreeMap<String, f64>,
}

impl OutputColumns {
    fn push(&mut self, name: &str, value: f64) {
        self.floats.entry(name.to_owned()).or_default().push(value);
    }

    fn push_p4(&mut self, prefix: &str, p4: &LorentzVector) {
        self.push(&format!("{prefix}_E"), p4.energy());
        self.push(&format!("{prefix}_Px"), p4.px());
        self.push(&format!("{prefix}_Py"), p4.py());
        self.push(&format!("{prefix}_Pz"), p4.pz());
    }

    fn push_position(&mut self, prefix: &str, position: &[f64; 3]) {
        for (axis, value) in ["Vx", "Vy", "Vz"].iter().zip(position) {
            self.push(&format!("{prefix}_{axis}"), *value);
        }
    }

    fn push_flag(&mut self, name: &str, value: bool) {
        self.flags.entry(name.to_owned()).or_default().push(value);
    }
}

fn origin_code(origin: Option<OriginLabel>) -> f64 {
    f64::from(origin.unwrap_or(OriginLabel::Unmatched).code())
}

impl JetEventOutput {
    /// Flattens the record into named columns.
    ///
    /// Scale-factor and truth columns only appear when the record carries
    /// them (simulation); shifted scale factors only in nominal jobs.
    pub fn to_columns(&self) -> OutputColumns {
        let mut columns = OutputColumns::default();
        for jet in &self.jets {
            columns.push_p4("Jet", &jet.p4);
            columns.push_flag("Jet_isLooseB", jet.is_loose_b);
            columns.push_flag("Jet_isMediumB", jet.is_medium_b);
            columns.push_flag("Jet_isTightB", jet.is_tight_b);
            if let Some(sf) = &jet.btag_sf {
                for wp in WorkingPoint::ALL {
                    let name = format!("Jet_{}bTagSF", wp.label().to_lowercase());
                    let values = sf.get(wp);
                    columns.push(&name, values.central);
                    if let (Some(up), Some(down)) = (values.up, values.down) {
                        columns.push(&format!("{name}Up"), up);
                        columns.push(&format!("{name}Down"), down);
                    }
                }
            }
            if jet.origin.is_some() {
                columns.push("Jet_isFromh", origin_code(jet.origin));
            }
            columns.push("Jet_FatJetIdx", f64::from(jet.fat_jet_index));
        }
        for fat in &self.fat_jets {
            columns.push_p4("FatJet", &fat.p4);
            for (n, tau) in fat.njettiness.iter().enumerate() {
                columns.push(&format!("FatJet_Njettiness{}", n + 1), *tau);
            }
            columns.push("FatJet_topVsHiggs", fat.top_vs_higgs);
            columns.push("FatJet_QCDVsHiggs", fat.qcd_vs_higgs);
            if fat.origin.is_some() {
                columns.push("FatJet_isFromh", origin_code(fat.origin));
            }
        }
        for constituent in &self.constituents {
            columns.push_p4("JetParticle", &constituent.p4);
            columns.push_position("JetParticle", &constituent.vertex);
            columns.push("JetParticle_Charge", constituent.charge);
            columns.push("JetParticle_FatJetIdx", constituent.fat_jet_index as f64);
        }
        for vertex in &self.vertices {
            columns.push_p4("SecondaryVertex", &vertex.p4);
            columns.push_position("SecondaryVertex", &vertex.position);
            columns.push("SecondaryVertex_FatJetIdx", vertex.fat_jet_index as f64);
        }
        columns.scalars.insert("MET_Px".to_owned(), self.met_px);
        columns.scalars.insert("MET_Py".to_owned(), self.met_py);
        columns.scalars.insert("HT".to_owned(), self.ht);
        columns
    }
}
