//! Provenance and schema descriptors attached to job artefacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version of the output record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information written next to the skimmed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Schema of the per-event output records.
    pub schema: SchemaVersion,
    /// Hash of the canonical job configuration.
    pub config_hash: String,
    /// Hash of the calibration bundle the providers were loaded from.
    pub calibration_hash: String,
    /// Master seed used for stochastic smearing.
    pub seed: u64,
    /// Systematic variation processed by the job (`None` for nominal).
    pub systematic: Option<String>,
    /// ISO-8601 timestamp recording when the artefact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
