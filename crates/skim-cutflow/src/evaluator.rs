//! Sequential evaluation of all channels for one event.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use tracing::debug;

use crate::channel::{ChannelConfig, CutflowChannel};
use crate::histogram::LabeledHistogram;

/// Label of the bin filled for every event entering the selection.
pub const NO_CUTS_LABEL: &str = "No cuts";

/// Bin label of the final jet requirement.
pub fn jet_requirement_label(min_jets: usize, fat_jets: usize) -> String {
    format!("N^{{AK4}}_{{jet}} >= {min_jets} && N^{{AK8}}_{{jet}} == {fat_jets}")
}

/// Histograms of every channel, written at job end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutflowReport {
    /// One histogram per channel, in configuration order.
    pub channels: Vec<LabeledHistogram>,
}

/// Owns all channels and applies the per-event checks.
#[derive(Debug, Clone, PartialEq)]
pub struct CutflowEvaluator {
    channels: Vec<CutflowChannel>,
}

impl CutflowEvaluator {
    /// Builds the evaluator. Channel names must be unique and scales finite.
    pub fn new(configs: Vec<ChannelConfig>) -> Result<Self, SkimError> {
        if configs.is_empty() {
            return Err(SkimError::Config(
                ErrorInfo::new("no-channels", "at least one cutflow channel is required")
                    .with_hint("add an entry under channels"),
            ));
        }
        let mut seen = BTreeSet::new();
        for config in &configs {
            if !seen.insert(config.name.as_str()) {
                return Err(SkimError::Config(
                    ErrorInfo::new("duplicate-channel", format!("channel {} configured twice", config.name))
                        .with_context("channel", config.name.clone()),
                ));
            }
            if !config.scale.is_finite() {
                return Err(SkimError::Config(
                    ErrorInfo::new("invalid-scale", "channel scale must be finite")
                        .with_context("channel", config.name.clone()),
                ));
            }
        }
        Ok(Self {
            channels: configs.into_iter().map(CutflowChannel::new).collect(),
        })
    }

    /// Channels in configuration order.
    pub fn channels(&self) -> &[CutflowChannel] {
        &self.channels
    }

    /// Revives every channel, sets its weight and fills [`NO_CUTS_LABEL`].
    pub fn begin_event(&mut self, event_weight: f64) {
        for channel in &mut self.channels {
            channel.begin_event(event_weight);
            channel.fill_if_alive(NO_CUTS_LABEL);
        }
    }

    /// Rejects channels whose jet minimum exceeds the raw jet count.
    pub fn early_jet_check(&mut self, raw_jets: usize) {
        for channel in &mut self.channels {
            if raw_jets < channel.config().min_jets {
                channel.reject();
            }
        }
    }

    /// Whether no channel is alive. Only used to skip work.
    pub fn all_rejected(&self) -> bool {
        self.channels.iter().all(|channel| !channel.is_alive())
    }

    /// Final requirement on the accepted object counts. Subjets are removed
    /// from the narrow-jet count before comparing.
    ///
    /// Returns the number of channels that filled.
    pub fn final_jet_check(&mut self, accepted_jets: usize, subjets: usize, fat_jets: usize) -> usize {
        let independent = accepted_jets.saturating_sub(subjets);
        let mut filled = 0;
        for channel in &mut self.channels {
            let (min_jets, required_fat) = (channel.config().min_jets, channel.config().fat_jets);
            if independent >= min_jets && fat_jets == required_fat {
                if channel.fill_if_alive(&jet_requirement_label(min_jets, required_fat)) {
                    filled += 1;
                }
            } else {
                channel.reject();
            }
        }
        debug!(independent, fat_jets, filled, "final jet requirement evaluated");
        filled
    }

    /// Consumes the evaluator into its histograms.
    pub fn into_report(self) -> CutflowReport {
        CutflowReport {
            channels: self
                .channels
                .into_iter()
                .map(CutflowChannel::into_histogram)
                .collect(),
        }
    }
}
