//! Channel configuration and per-event state.

use serde::{Deserialize, Serialize};

use crate::histogram::LabeledHistogram;

/// Thresholds of one selection channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Channel name, also the histogram name.
    pub name: String,
    /// Minimum number of narrow jets not counted as subjets.
    #[serde(default)]
    pub min_jets: usize,
    /// Exact number of accepted wide jets.
    #[serde(default)]
    pub fat_jets: usize,
    /// Multiplier applied to the event weight.
    #[serde(default = "ChannelConfig::default_scale")]
    pub scale: f64,
}

impl ChannelConfig {
    fn default_scale() -> f64 {
        1.0
    }

    /// Channel with unit scale.
    pub fn new(name: impl Into<String>, min_jets: usize, fat_jets: usize) -> Self {
        Self {
            name: name.into(),
            min_jets,
            fat_jets,
            scale: Self::default_scale(),
        }
    }
}

/// Channel state owned by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct CutflowChannel {
    config: ChannelConfig,
    alive: bool,
    weight: f64,
    histogram: LabeledHistogram,
}

impl CutflowChannel {
    pub(crate) fn new(config: ChannelConfig) -> Self {
        let histogram = LabeledHistogram::new(config.name.clone());
        Self {
            config,
            alive: true,
            weight: 0.0,
            histogram,
        }
    }

    /// Configuration the channel was built from.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Whether the channel is still alive in the current event.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Weight of the current event for this channel.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Histogram accumulated so far.
    pub fn histogram(&self) -> &LabeledHistogram {
        &self.histogram
    }

    pub(crate) fn begin_event(&mut self, event_weight: f64) {
        self.alive = true;
        self.weight = self.config.scale * event_weight;
    }

    pub(crate) fn reject(&mut self) {
        self.alive = false;
    }

    /// Fills `label` when alive. Returns whether a fill happened.
    pub(crate) fn fill_if_alive(&mut self, label: &str) -> bool {
        if self.alive {
            self.histogram.fill(label, self.weight);
        }
        self.alive
    }

    pub(crate) fn into_histogram(self) -> LabeledHistogram {
        self.histogram
    }
}
