#![deny(missing_docs)]

//! Generator-level ancestry resolution.
//!
//! Truth particles are stored in an arena ([`TruthForest`]) with optional
//! parent indices. Every walk is bounded by the particle count, so malformed
//! links (self references, indices past the end, cycles) end a walk instead of
//! hanging it.

/// Arena of truth particles and bounded parent walks.
pub mod forest;
/// Truth-origin classification of corrected jets.
pub mod origin;

pub use forest::{Ancestors, TruthForest, TruthParticle};
pub use origin::{classify_origin, OriginLabel, HEAVY_RESONANCE, LIGHT_RESONANCE};
