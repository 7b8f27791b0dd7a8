use serde::{Deserialize, Serialize};

use crate::{missing_value, Collection, DataSource, EventScalar, Field};

/// Reconstructed narrow jet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoJet {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
    /// Catchment area.
    pub area: f64,
    /// DeepFlavour b probability.
    #[serde(default)]
    pub prob_b: f64,
    /// DeepFlavour bb probability.
    #[serde(default)]
    pub prob_bb: f64,
    /// DeepFlavour leptonic b probability.
    #[serde(default)]
    pub prob_lepb: f64,
}

/// Particle-flow candidate or composite daughter of a fat jet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Candidate {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
    /// Vertex x position.
    #[serde(default)]
    pub vx: f64,
    /// Vertex y position.
    #[serde(default)]
    pub vy: f64,
    /// Vertex z position.
    #[serde(default)]
    pub vz: f64,
    /// Electric charge.
    #[serde(default)]
    pub charge: f64,
    /// Daughters of a composite candidate.
    #[serde(default)]
    pub daughters: Vec<Candidate>,
}

/// Reconstructed wide jet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecoFatJet {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
    /// Catchment area.
    pub area: f64,
    /// N-subjettiness tau1.
    #[serde(default)]
    pub tau1: f64,
    /// N-subjettiness tau2.
    #[serde(default)]
    pub tau2: f64,
    /// N-subjettiness tau3.
    #[serde(default)]
    pub tau3: f64,
    /// H→bb probability.
    #[serde(default)]
    pub prob_hbb: f64,
    /// Top probabilities (bcq, bqq, bc, bq).
    #[serde(default)]
    pub prob_top: [f64; 4],
    /// Hbb-versus-QCD discriminant.
    #[serde(default)]
    pub hbb_vs_qcd: f64,
    /// Direct daughters of the jet.
    #[serde(default)]
    pub daughters: Vec<Candidate>,
}

/// Generator-level jet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenJetRecord {
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
}

/// Generator-level particle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenParticleRecord {
    /// Signed species identifier.
    pub pdg_id: i32,
    /// Generator status code.
    #[serde(default)]
    pub status: i32,
    /// Transverse momentum.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    #[serde(default)]
    pub mass: f64,
    /// Parent particle index.
    #[serde(default)]
    pub parent: Option<usize>,
}

/// Reconstructed secondary vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Transverse momentum of the vertex tracks.
    pub pt: f64,
    /// Pseudorapidity.
    pub eta: f64,
    /// Azimuth.
    pub phi: f64,
    /// Mass.
    pub mass: f64,
    /// Vertex x position.
    pub vx: f64,
    /// Vertex y position.
    pub vy: f64,
    /// Vertex z position.
    pub vz: f64,
}

/// Serialized form of an object-mode event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Run number.
    pub run: u32,
    /// Median pileup energy density.
    pub rho: f64,
    /// Uncorrected missing transverse momentum.
    pub met_pt: f64,
    /// Missing transverse momentum azimuth.
    pub met_phi: f64,
    /// Generator event weight.
    #[serde(default = "default_weight")]
    pub gen_weight: f64,
    /// Narrow jets.
    #[serde(default)]
    pub jets: Vec<RecoJet>,
    /// Wide jets.
    #[serde(default)]
    pub fat_jets: Vec<RecoFatJet>,
    /// Generator narrow jets.
    #[serde(default)]
    pub gen_jets: Vec<GenJetRecord>,
    /// Generator wide jets.
    #[serde(default)]
    pub gen_fat_jets: Vec<GenJetRecord>,
    /// Generator particles.
    #[serde(default)]
    pub gen_particles: Vec<GenParticleRecord>,
    /// Secondary vertices.
    #[serde(default)]
    pub secondary_vertices: Vec<VertexRecord>,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ObjectRecord {
    fn default() -> Self {
        Self {
            run: 0,
            rho: 0.0,
            met_pt: 0.0,
            met_phi: 0.0,
            gen_weight: default_weight(),
            jets: Vec::new(),
            fat_jets: Vec::new(),
            gen_jets: Vec::new(),
            gen_fat_jets: Vec::new(),
            gen_particles: Vec::new(),
            secondary_vertices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FlatConstituent {
    fat_jet: usize,
    pt: f64,
    eta: f64,
    phi: f64,
    mass: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    charge: f64,
}

impl FlatConstituent {
    fn new(fat_jet: usize, cand: &Candidate) -> Self {
        Self {
            fat_jet,
            pt: cand.pt,
            eta: cand.eta,
            phi: cand.phi,
            mass: cand.mass,
            vx: cand.vx,
            vy: cand.vy,
            vz: cand.vz,
            charge: cand.charge,
        }
    }
}

/// Object-collection backend.
///
/// Fat-jet constituents are flattened once on construction: a daughter with
/// no daughters of its own is a constituent, otherwise its daughters are.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEvent {
    record: ObjectRecord,
    constituents: Vec<FlatConstituent>,
}

impl From<ObjectRecord> for ObjectEvent {
    fn from(record: ObjectRecord) -> Self {
        let mut constituents = Vec::new();
        for (index, fat_jet) in record.fat_jets.iter().enumerate() {
            for daughter in &fat_jet.daughters {
                if daughter.daughters.is_empty() {
                    constituents.push(FlatConstituent::new(index, daughter));
                } else {
                    constituents.extend(
                        daughter
                            .daughters
                            .iter()
                            .map(|grand| FlatConstituent::new(index, grand)),
                    );
                }
            }
        }
        Self {
            record,
            constituents,
        }
    }
}

impl ObjectEvent {
    /// Returns the underlying record.
    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }
}

fn gen_jet_value(jet: &GenJetRecord, field: Field) -> f64 {
    match field {
        Field::Pt => jet.pt,
        Field::Eta => jet.eta,
        Field::Phi => jet.phi,
        Field::Mass => jet.mass,
        _ => missing_value(field),
    }
}

impl DataSource for ObjectEvent {
    fn size(&self, collection: Collection) -> usize {
        match collection {
            Collection::Jet => self.record.jets.len(),
            Collection::FatJet => self.record.fat_jets.len(),
            Collection::GenJet => self.record.gen_jets.len(),
            Collection::GenFatJet => self.record.gen_fat_jets.len(),
            Collection::GenParticle => self.record.gen_particles.len(),
            Collection::JetConstituent => self.constituents.len(),
            Collection::SecondaryVertex => self.record.secondary_vertices.len(),
        }
    }

    fn value(&self, collection: Collection, field: Field, index: usize) -> f64 {
        let record = &self.record;
        match collection {
            Collection::Jet => {
                let jet = &record.jets[index];
                match field {
                    Field::Pt => jet.pt,
                    Field::Eta => jet.eta,
                    Field::Phi => jet.phi,
                    Field::Mass => jet.mass,
                    Field::Area => jet.area,
                    Field::BTagDiscriminant => jet.prob_b + jet.prob_bb + jet.prob_lepb,
                    _ => missing_value(field),
                }
            }
            Collection::FatJet => {
                let jet = &record.fat_jets[index];
                match field {
                    Field::Pt => jet.pt,
                    Field::Eta => jet.eta,
                    Field::Phi => jet.phi,
                    Field::Mass => jet.mass,
                    Field::Area => jet.area,
                    Field::Tau1 => jet.tau1,
                    Field::Tau2 => jet.tau2,
                    Field::Tau3 => jet.tau3,
                    Field::HbbScore => jet.prob_hbb,
                    Field::TopScore => jet.prob_top.iter().sum(),
                    Field::HbbVsQcd => jet.hbb_vs_qcd,
                    _ => missing_value(field),
                }
            }
            Collection::GenJet => gen_jet_value(&record.gen_jets[index], field),
            Collection::GenFatJet => gen_jet_value(&record.gen_fat_jets[index], field),
            Collection::GenParticle => {
                let part = &record.gen_particles[index];
                match field {
                    Field::Pt => part.pt,
                    Field::Eta => part.eta,
                    Field::Phi => part.phi,
                    Field::Mass => part.mass,
                    Field::PdgId => f64::from(part.pdg_id),
                    Field::Status => f64::from(part.status),
                    Field::ParentIndex => part.parent.map_or(-1.0, |parent| parent as f64),
                    _ => missing_value(field),
                }
            }
            Collection::JetConstituent => {
                let cand = &self.constituents[index];
                match field {
                    Field::Pt => cand.pt,
                    Field::Eta => cand.eta,
                    Field::Phi => cand.phi,
                    Field::Mass => cand.mass,
                    Field::Vx => cand.vx,
                    Field::Vy => cand.vy,
                    Field::Vz => cand.vz,
                    Field::Charge => cand.charge,
                    Field::FatJetIndex => cand.fat_jet as f64,
                    _ => missing_value(field),
                }
            }
            Collection::SecondaryVertex => {
                let vtx = &record.secondary_vertices[index];
                match field {
                    Field::Pt => vtx.pt,
                    Field::Eta => vtx.eta,
                    Field::Phi => vtx.phi,
                    Field::Mass => vtx.mass,
                    Field::Vx => vtx.vx,
                    Field::Vy => vtx.vy,
                    Field::Vz => vtx.vz,
                    _ => missing_value(field),
                }
            }
        }
    }

    fn scalar(&self, scalar: EventScalar) -> f64 {
        match scalar {
            EventScalar::Rho => self.record.rho,
            EventScalar::MetPt => self.record.met_pt,
            EventScalar::MetPhi => self.record.met_phi,
            EventScalar::GenWeight => self.record.gen_weight,
        }
    }

    fn run_number(&self) -> u32 {
        self.record.run
    }
}
