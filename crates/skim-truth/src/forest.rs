use serde::{Deserialize, Serialize};
use skim_core::LorentzVector;
use skim_source::{four_vector, index_field, Collection, DataSource, Field};
use tracing::debug;

/// One node of the truth forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthParticle {
    /// Signed species identifier.
    pub species: i32,
    /// Generator status code.
    pub status: i32,
    /// Four-momentum.
    pub momentum: LorentzVector,
    /// Parent index within the forest.
    pub parent: Option<usize>,
}

impl TruthParticle {
    /// Whether the particle carries `species` up to charge sign.
    pub fn is_species(&self, species: i32) -> bool {
        self.species.abs() == species.abs()
    }
}

/// Arena of truth particles linked by parent indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TruthForest {
    particles: Vec<TruthParticle>,
}

impl TruthForest {
    /// Builds a forest, dropping parent links that point past the end of the
    /// arena or at the particle itself.
    pub fn new(mut particles: Vec<TruthParticle>) -> Self {
        let len = particles.len();
        let mut dropped = 0usize;
        for (index, particle) in particles.iter_mut().enumerate() {
            if let Some(parent) = particle.parent {
                if parent >= len || parent == index {
                    particle.parent = None;
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            debug!(dropped, particles = len, "dropped malformed truth parent links");
        }
        Self { particles }
    }

    /// Reads the generator particle collection of an event.
    pub fn from_source(source: &dyn DataSource) -> Self {
        let size = source.size(Collection::GenParticle);
        let particles = (0..size)
            .map(|index| TruthParticle {
                species: source.value(Collection::GenParticle, Field::PdgId, index) as i32,
                status: source.value(Collection::GenParticle, Field::Status, index) as i32,
                momentum: four_vector(source, Collection::GenParticle, index),
                parent: index_field(source, Collection::GenParticle, Field::ParentIndex, index),
            })
            .collect();
        Self::new(particles)
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the forest is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particle at `index`.
    pub fn get(&self, index: usize) -> Option<&TruthParticle> {
        self.particles.get(index)
    }

    /// All particles in collection order.
    pub fn particles(&self) -> &[TruthParticle] {
        &self.particles
    }

    /// Parent index of `index`, if any.
    pub fn parent(&self, index: usize) -> Option<usize> {
        self.particles.get(index).and_then(|particle| particle.parent)
    }

    /// Iterates over the ancestors of `start`, nearest first.
    pub fn ancestors(&self, start: usize) -> Ancestors<'_> {
        Ancestors {
            forest: self,
            current: start,
            budget: self.particles.len(),
        }
    }

    /// Earliest node of the same-species chain that ends at `start`.
    ///
    /// Returns `start` unchanged when it does not carry `species` or when its
    /// parent is a different species. Species are compared up to sign. A chain
    /// that loops back on itself resolves to the lowest index in the loop, so
    /// every member of the loop maps to the same node.
    pub fn first_copy(&self, start: usize, species: i32) -> usize {
        match self.particles.get(start) {
            Some(particle) if particle.is_species(species) => {}
            _ => return start,
        }
        let mut path = vec![start];
        let mut current = start;
        while let Some(parent) = self.parent(current) {
            if !self.particles[parent].is_species(species) {
                break;
            }
            if let Some(seen) = path.iter().position(|&index| index == parent) {
                return path[seen..].iter().copied().min().unwrap_or(parent);
            }
            path.push(parent);
            current = parent;
        }
        current
    }
}

/// Bounded iterator over parent links.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    forest: &'a TruthForest,
    current: usize,
    budget: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        let parent = self.forest.parent(self.current)?;
        self.current = parent;
        Some(parent)
    }
}
