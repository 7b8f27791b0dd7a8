#![deny(missing_docs)]

//! Selection channels evaluated side by side in one event loop.
//!
//! Every channel carries its own thresholds, a per-event alive flag and a
//! labeled histogram that persists for the whole job. Rejection is ordinary
//! control flow: it only stops further fills for that channel in the current
//! event.

pub mod channel;
pub mod evaluator;
pub mod histogram;

pub use channel::{ChannelConfig, CutflowChannel};
pub use evaluator::{jet_requirement_label, CutflowEvaluator, CutflowReport, NO_CUTS_LABEL};
pub use histogram::{LabeledBin, LabeledHistogram};
