#![deny(missing_docs)]
#![doc = "Core error, randomness and kinematic types shared by the skimming crates."]

pub mod errors;
pub mod hash;
pub mod kinematics;
pub mod provenance;
pub mod rng;
pub mod serde;

pub use errors::{ErrorInfo, SkimError};
pub use hash::stable_hash_string;
pub use kinematics::{delta_phi, delta_r, LorentzVector};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

use ::serde::{Deserialize, Serialize};

/// Jet clustering flavour processed by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JetKind {
    /// Narrow jets clustered with R = 0.4.
    Ak4,
    /// Wide ("fat") jets clustered with R = 0.8.
    Ak8,
}

impl JetKind {
    /// Both kinds in processing order of the calibration loader.
    pub const ALL: [JetKind; 2] = [JetKind::Ak4, JetKind::Ak8];

    /// Label substituted for the `&` placeholder in calibration descriptors.
    pub fn label(&self) -> &'static str {
        match self {
            JetKind::Ak4 => "AK4",
            JetKind::Ak8 => "AK8",
        }
    }

    /// Clustering cone radius.
    pub fn cone_size(&self) -> f64 {
        match self {
            JetKind::Ak4 => 0.4,
            JetKind::Ak8 => 0.8,
        }
    }
}

/// Direction of a one-sided systematic shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variation {
    /// Upward shift.
    Up,
    /// Downward shift.
    Down,
}

impl Variation {
    /// Returns `+1.0` for up and `-1.0` for down.
    pub fn sign(&self) -> f64 {
        match self {
            Variation::Up => 1.0,
            Variation::Down => -1.0,
        }
    }
}

/// One value per [`JetKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerKind<T> {
    /// Value for narrow jets.
    pub ak4: T,
    /// Value for wide jets.
    pub ak8: T,
}

impl<T> PerKind<T> {
    /// Builds both entries with a fallible constructor, narrow kind first.
    pub fn try_build<E>(mut build: impl FnMut(JetKind) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            ak4: build(JetKind::Ak4)?,
            ak8: build(JetKind::Ak8)?,
        })
    }

    /// Entry for `kind`.
    pub fn get(&self, kind: JetKind) -> &T {
        match kind {
            JetKind::Ak4 => &self.ak4,
            JetKind::Ak8 => &self.ak8,
        }
    }

    /// Mutable entry for `kind`.
    pub fn get_mut(&mut self, kind: JetKind) -> &mut T {
        match kind {
            JetKind::Ak4 => &mut self.ak4,
            JetKind::Ak8 => &mut self.ak8,
        }
    }
}
