use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use skim_core::errors::{ErrorInfo, SkimError};
use tracing::debug;

use crate::{missing_value, Collection, DataSource, EventScalar, Field};

/// One event stored as named flat arrays, e.g. `Jet_pt`, `GenPart_pdgId`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnarEvent {
    /// Run number.
    pub run: u32,
    /// Event-level scalars keyed by branch name.
    #[serde(default)]
    pub scalars: BTreeMap<String, f64>,
    /// Per-object arrays keyed by branch name.
    #[serde(default)]
    pub columns: HashMap<String, Vec<f64>>,
}

fn prefix(collection: Collection) -> &'static str {
    match collection {
        Collection::Jet => "Jet",
        Collection::FatJet => "FatJet",
        Collection::GenJet => "GenJet",
        Collection::GenFatJet => "GenJetAK8",
        Collection::GenParticle => "GenPart",
        Collection::JetConstituent => "FatJetPFCand",
        Collection::SecondaryVertex => "SV",
    }
}

fn suffix(field: Field) -> &'static str {
    match field {
        Field::Pt => "pt",
        Field::Eta => "eta",
        Field::Phi => "phi",
        Field::Mass => "mass",
        Field::Area => "area",
        Field::BTagDiscriminant => "btagDeepFlavB",
        Field::HbbScore => "probHbb",
        Field::TopScore => "probTop",
        Field::HbbVsQcd => "HbbvsQCD",
        Field::Tau1 => "tau1",
        Field::Tau2 => "tau2",
        Field::Tau3 => "tau3",
        Field::PdgId => "pdgId",
        Field::Status => "status",
        Field::ParentIndex => "genPartIdxMother",
        Field::Vx => "x",
        Field::Vy => "y",
        Field::Vz => "z",
        Field::Charge => "charge",
        Field::FatJetIndex => "fatJetIdx",
    }
}

static BRANCH_NAMES: OnceLock<HashMap<(Collection, Field), String>> = OnceLock::new();

/// Interned branch name; the table is built on first use.
fn branch_key(collection: Collection, field: Field) -> &'static str {
    let names = BRANCH_NAMES.get_or_init(|| {
        Collection::ALL
            .iter()
            .flat_map(|&collection| {
                Field::ALL.iter().map(move |&field| {
                    ((collection, field), format!("{}_{}", prefix(collection), suffix(field)))
                })
            })
            .collect()
    });
    names
        .get(&(collection, field))
        .map(String::as_str)
        .unwrap_or_default()
}

/// Branch name backing a collection field.
pub fn branch_name(collection: Collection, field: Field) -> String {
    branch_key(collection, field).to_owned()
}

fn scalar_name(scalar: EventScalar) -> &'static str {
    match scalar {
        EventScalar::Rho => "fixedGridRhoFastjetAll",
        EventScalar::MetPt => "MET_pt",
        EventScalar::MetPhi => "MET_phi",
        EventScalar::GenWeight => "genWeight",
    }
}

static RECO_KINEMATICS: [Field; 5] = [Field::Pt, Field::Eta, Field::Phi, Field::Mass, Field::Area];
static GEN_KINEMATICS: [Field; 4] = [Field::Pt, Field::Eta, Field::Phi, Field::Mass];
static JET_TAGGING: [Field; 1] = [Field::BTagDiscriminant];
static GEN_LINKS: [Field; 2] = [Field::PdgId, Field::ParentIndex];

impl ColumnarEvent {
    /// Creates an empty event for the given run.
    pub fn new(run: u32) -> Self {
        Self {
            run,
            ..Self::default()
        }
    }

    /// Inserts a per-object column for a collection field.
    pub fn with_column(mut self, collection: Collection, field: Field, values: Vec<f64>) -> Self {
        self.columns.insert(branch_name(collection, field), values);
        self
    }

    /// Inserts an event scalar.
    pub fn with_scalar(mut self, scalar: EventScalar, value: f64) -> Self {
        self.scalars.insert(scalar_name(scalar).to_string(), value);
        self
    }

    /// Checks that the branches the jet analyzer reads are present and that
    /// every column of a collection has the same length.
    ///
    /// Called once per event when the event is loaded, so a malformed input
    /// fails before any object is processed.
    pub fn validate(&self, is_data: bool) -> Result<(), SkimError> {
        let mut required: Vec<(Collection, &[Field])> = vec![
            (Collection::Jet, &RECO_KINEMATICS[..]),
            (Collection::Jet, &JET_TAGGING[..]),
            (Collection::FatJet, &RECO_KINEMATICS[..]),
        ];
        if !is_data {
            required.push((Collection::GenJet, &GEN_KINEMATICS[..]));
            required.push((Collection::GenFatJet, &GEN_KINEMATICS[..]));
            required.push((Collection::GenParticle, &GEN_KINEMATICS[..]));
            required.push((Collection::GenParticle, &GEN_LINKS[..]));
        }
        for (collection, fields) in required {
            for field in fields {
                let name = branch_key(collection, *field);
                if !self.columns.contains_key(name) {
                    return Err(missing_column(name, self.run));
                }
            }
        }
        for scalar in [EventScalar::Rho, EventScalar::MetPt, EventScalar::MetPhi] {
            let name = scalar_name(scalar);
            if !self.scalars.contains_key(name) {
                return Err(missing_column(name, self.run));
            }
        }

        let mut lengths: BTreeMap<&str, (usize, &str)> = BTreeMap::new();
        for (name, values) in &self.columns {
            let Some((collection, _)) = name.split_once('_') else {
                continue;
            };
            match lengths.get(collection) {
                Some((expected, first)) if *expected != values.len() => {
                    return Err(SkimError::Source(
                        ErrorInfo::new("ragged-collection", "columns of one collection differ in length")
                            .with_context("collection", collection)
                            .with_context("column", name.as_str())
                            .with_context("reference", *first)
                            .with_context("run", self.run.to_string()),
                    ));
                }
                Some(_) => {}
                None => {
                    lengths.insert(collection, (values.len(), name.as_str()));
                }
            }
        }
        debug!(run = self.run, columns = self.columns.len(), "validated columnar event");
        Ok(())
    }

    fn column(&self, collection: Collection, field: Field) -> Option<&Vec<f64>> {
        self.columns.get(branch_key(collection, field))
    }
}

fn missing_column(name: &str, run: u32) -> SkimError {
    SkimError::Source(
        ErrorInfo::new("missing-column", format!("required branch {name} is absent"))
            .with_context("branch", name)
            .with_context("run", run.to_string()),
    )
}

impl DataSource for ColumnarEvent {
    fn size(&self, collection: Collection) -> usize {
        let size_field = match collection {
            Collection::GenParticle => Field::PdgId,
            _ => Field::Pt,
        };
        self.column(collection, size_field).map_or(0, Vec::len)
    }

    fn value(&self, collection: Collection, field: Field, index: usize) -> f64 {
        self.column(collection, field)
            .and_then(|values| values.get(index).copied())
            .unwrap_or_else(|| missing_value(field))
    }

    fn scalar(&self, scalar: EventScalar) -> f64 {
        match self.scalars.get(scalar_name(scalar)) {
            Some(value) => *value,
            None if scalar == EventScalar::GenWeight => 1.0,
            None => 0.0,
        }
    }

    fn run_number(&self) -> u32 {
        self.run
    }
}
