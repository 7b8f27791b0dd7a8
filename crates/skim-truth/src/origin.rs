use serde::{Deserialize, Serialize};
use skim_core::{JetKind, LorentzVector};

use crate::forest::TruthForest;

/// Species of the intermediate (light) resonance a parton must come from.
pub const LIGHT_RESONANCE: i32 = 25;
/// Species of the heavy resonance that may sit above the light one.
pub const HEAVY_RESONANCE: i32 = 37;

/// Truth-origin label attached to a corrected jet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum OriginLabel {
    /// No matched parton chain through the light resonance.
    Unmatched,
    /// Partons come from a light resonance with no heavy resonance above it.
    LightResonance,
    /// Every matched light resonance was produced by the heavy resonance.
    HeavyResonance,
}

impl OriginLabel {
    /// Integer encoding written to the output (`-1`, `1`, `2`).
    pub fn code(&self) -> i32 {
        match self {
            OriginLabel::Unmatched => -1,
            OriginLabel::LightResonance => 1,
            OriginLabel::HeavyResonance => 2,
        }
    }
}

impl From<OriginLabel> for i32 {
    fn from(label: OriginLabel) -> i32 {
        label.code()
    }
}

impl TryFrom<i32> for OriginLabel {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(OriginLabel::Unmatched),
            1 => Ok(OriginLabel::LightResonance),
            2 => Ok(OriginLabel::HeavyResonance),
            other => Err(format!("invalid origin label {other}")),
        }
    }
}

/// Maximum angular distance between a parton and the reference jet.
pub fn match_radius(kind: JetKind) -> f64 {
    match kind {
        JetKind::Ak4 => 0.3,
        JetKind::Ak8 => 0.4,
    }
}

/// Number of distinct matched partons needed before a label is returned.
pub fn required_partons(kind: JetKind) -> usize {
    match kind {
        JetKind::Ak4 => 1,
        JetKind::Ak8 => 2,
    }
}

/// Classifies where the partons behind a jet come from.
///
/// `reference` is the generator jet matched during smearing; without one the
/// jet is [`OriginLabel::Unmatched`]. Particles of `target` species are
/// scanned in collection order and reduced to their first copy; a first copy
/// within [`match_radius`] of the reference whose parent is a
/// [`LIGHT_RESONANCE`] counts as a matched parton. Each distinct first copy
/// counts once. As soon as [`required_partons`] are matched the label is
/// [`OriginLabel::HeavyResonance`] if the first copy of every matched light
/// resonance has a [`HEAVY_RESONANCE`] parent, otherwise
/// [`OriginLabel::LightResonance`].
pub fn classify_origin(
    forest: &TruthForest,
    reference: Option<&LorentzVector>,
    target: i32,
    kind: JetKind,
) -> OriginLabel {
    let Some(reference) = reference else {
        return OriginLabel::Unmatched;
    };
    let radius = match_radius(kind);
    let required = required_partons(kind);
    let mut counted: Vec<usize> = Vec::with_capacity(required);
    let mut all_heavy = true;

    for (index, particle) in forest.particles().iter().enumerate() {
        if !particle.is_species(target) {
            continue;
        }
        let copy = forest.first_copy(index, target);
        if counted.contains(&copy) {
            continue;
        }
        let Some(parton) = forest.get(copy) else {
            continue;
        };
        if parton.momentum.delta_r(reference) >= radius {
            continue;
        }
        let Some(resonance) = forest.parent(copy) else {
            continue;
        };
        if !forest
            .get(resonance)
            .is_some_and(|node| node.is_species(LIGHT_RESONANCE))
        {
            continue;
        }

        counted.push(copy);
        let resonance = forest.first_copy(resonance, LIGHT_RESONANCE);
        let from_heavy = forest
            .parent(resonance)
            .and_then(|grand| forest.get(grand))
            .is_some_and(|node| node.is_species(HEAVY_RESONANCE));
        all_heavy &= from_heavy;

        if counted.len() == required {
            return if all_heavy {
                OriginLabel::HeavyResonance
            } else {
                OriginLabel::LightResonance
            };
        }
    }
    OriginLabel::Unmatched
}
