#![deny(missing_docs)]

//! Uniform per-event accessor over two event backends.
//!
//! Every analyzer is written against [`DataSource`]. The driver picks the
//! backend once: [`ColumnarEvent`] indexes named flat arrays, [`ObjectEvent`]
//! indexes typed object collections. Where the two backends store a quantity
//! differently (the jet b-tag discriminant, fat-jet constituents, top scores)
//! the difference is resolved inside the backend.

/// Flat named-array backend.
pub mod columnar;
/// Typed object-collection backend.
pub mod object;

pub use columnar::ColumnarEvent;
pub use object::{
    Candidate, GenJetRecord, GenParticleRecord, ObjectEvent, ObjectRecord, RecoFatJet, RecoJet,
    VertexRecord,
};

use serde::{Deserialize, Serialize};
use skim_core::LorentzVector;

/// Per-event object collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// Reconstructed narrow jets.
    Jet,
    /// Reconstructed wide jets.
    FatJet,
    /// Generator-level narrow jets.
    GenJet,
    /// Generator-level wide jets.
    GenFatJet,
    /// Generator-level particles with parent links.
    GenParticle,
    /// Flattened fat-jet constituents.
    JetConstituent,
    /// Reconstructed secondary vertices.
    SecondaryVertex,
}

/// Numeric per-object fields.
///
/// Fields a collection does not carry read as `0.0`, except
/// [`Field::ParentIndex`] and [`Field::FatJetIndex`] which read as `-1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Transverse momentum.
    Pt,
    /// Pseudorapidity.
    Eta,
    /// Azimuth.
    Phi,
    /// Mass.
    Mass,
    /// Jet catchment area.
    Area,
    /// Narrow-jet b-tag discriminant.
    BTagDiscriminant,
    /// Fat-jet H→bb probability.
    HbbScore,
    /// Fat-jet summed top-quark probability.
    TopScore,
    /// Fat-jet Hbb-versus-QCD discriminant.
    HbbVsQcd,
    /// N-subjettiness tau1.
    Tau1,
    /// N-subjettiness tau2.
    Tau2,
    /// N-subjettiness tau3.
    Tau3,
    /// Particle species identifier (signed PDG id).
    PdgId,
    /// Generator status code.
    Status,
    /// Index of the parent particle, `-1` when absent.
    ParentIndex,
    /// Vertex x position.
    Vx,
    /// Vertex y position.
    Vy,
    /// Vertex z position.
    Vz,
    /// Electric charge.
    Charge,
    /// Index of the owning fat jet in the raw fat-jet collection.
    FatJetIndex,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 7] = [
        Collection::Jet,
        Collection::FatJet,
        Collection::GenJet,
        Collection::GenFatJet,
        Collection::GenParticle,
        Collection::JetConstituent,
        Collection::SecondaryVertex,
    ];
}

impl Field {
    /// Every field.
    pub const ALL: [Field; 20] = [
        Field::Pt,
        Field::Eta,
        Field::Phi,
        Field::Mass,
        Field::Area,
        Field::BTagDiscriminant,
        Field::HbbScore,
        Field::TopScore,
        Field::HbbVsQcd,
        Field::Tau1,
        Field::Tau2,
        Field::Tau3,
        Field::PdgId,
        Field::Status,
        Field::ParentIndex,
        Field::Vx,
        Field::Vy,
        Field::Vz,
        Field::Charge,
        Field::FatJetIndex,
    ];
}

/// Value of a field the collection does not carry.
pub(crate) fn missing_value(field: Field) -> f64 {
    match field {
        Field::ParentIndex | Field::FatJetIndex => -1.0,
        _ => 0.0,
    }
}

/// Per-event scalar quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventScalar {
    /// Median pileup energy density.
    Rho,
    /// Missing transverse momentum magnitude.
    MetPt,
    /// Missing transverse momentum azimuth.
    MetPhi,
    /// Generator event weight (1 for data).
    GenWeight,
}

/// Accessor contract shared by both backends.
///
/// Implementations answer every call in O(1) relative to the event.
pub trait DataSource {
    /// Number of objects in a collection.
    fn size(&self, collection: Collection) -> usize;

    /// Value of a field for object `index` (`index < size(collection)`).
    fn value(&self, collection: Collection, field: Field, index: usize) -> f64;

    /// Per-event scalar.
    fn scalar(&self, scalar: EventScalar) -> f64;

    /// Run number of the event.
    fn run_number(&self) -> u32;
}

/// Reads the four-momentum of object `index`.
pub fn four_vector(source: &dyn DataSource, collection: Collection, index: usize) -> LorentzVector {
    LorentzVector::from_pt_eta_phi_m(
        source.value(collection, Field::Pt, index),
        source.value(collection, Field::Eta, index),
        source.value(collection, Field::Phi, index),
        source.value(collection, Field::Mass, index),
    )
}

/// Reads an index-valued field, mapping negative or non-finite values to `None`.
pub fn index_field(
    source: &dyn DataSource,
    collection: Collection,
    field: Field,
    index: usize,
) -> Option<usize> {
    let raw = source.value(collection, field, index);
    if raw.is_finite() && raw >= 0.0 {
        Some(raw as usize)
    } else {
        None
    }
}
