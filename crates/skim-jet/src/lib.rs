#![deny(missing_docs)]

//! Jet and fat-jet analysis for one event at a time.
//!
//! Fat jets are processed first (correction, smearing, selection, truth
//! label, constituents and secondary vertices), then narrow jets
//! (correction, smearing, MET propagation, selection, b-tagging, truth label,
//! fat-jet association). The accepted counts feed the cutflow.

pub mod analyzer;
pub mod config;
pub mod output;

pub use analyzer::JetAnalyzer;
pub use config::JetAnalyzerConfig;
pub use output::{
    BTagScaleFactors, ConstituentOutput, FatJetOutput, JetEventOutput, JetOutput, OutputColumns,
    VertexOutput,
};
