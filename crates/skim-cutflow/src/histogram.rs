//! One-dimensional histogram with string bin labels.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Accumulated content of one labeled bin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabeledBin {
    /// Sum of fill weights.
    pub sum_weights: f64,
    /// Sum of squared fill weights.
    pub sum_weights_sq: f64,
    /// Number of fills.
    pub entries: u64,
}

/// Histogram whose bins are created on first fill and kept in fill order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabeledHistogram {
    /// Histogram name.
    pub name: String,
    /// Bins keyed by label, in creation order.
    pub bins: IndexMap<String, LabeledBin>,
}

impl LabeledHistogram {
    /// Creates an empty histogram.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bins: IndexMap::new(),
        }
    }

    /// Adds `weight` to the bin labeled `label`.
    pub fn fill(&mut self, label: &str, weight: f64) {
        let bin = self.bins.entry(label.to_owned()).or_default();
        bin.sum_weights += weight;
        bin.sum_weights_sq += weight * weight;
        bin.entries += 1;
    }

    /// Bin content for `label`.
    pub fn bin(&self, label: &str) -> Option<&LabeledBin> {
        self.bins.get(label)
    }

    /// Labels in creation order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bins.keys().map(String::as_str)
    }
}
