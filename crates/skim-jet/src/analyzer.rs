//! The per-event jet pipeline.

use std::sync::Arc;

use skim_calib::{
    resolve_descriptor, BTagProvider, CalibrationLoader, EnergyCorrector, EraCalibration, Flavor,
    ResolutionSmearer, Systematic, WorkingPoint, WorkingPointCuts,
};
use skim_core::errors::SkimError;
use skim_core::{JetKind, LorentzVector, RngHandle};
use skim_cutflow::CutflowEvaluator;
use skim_source::{four_vector, index_field, Collection, DataSource, EventScalar, Field};
use skim_truth::{classify_origin, OriginLabel, TruthForest};
use tracing::{debug, info};

use crate::config::JetAnalyzerConfig;
use crate::output::{
    BTagScaleFactors, ConstituentOutput, FatJetOutput, JetEventOutput, JetOutput, VertexOutput,
};

/// Simulation-only state: smearing, truth and b-tag scale factors.
struct SimulationTools {
    smearer: ResolutionSmearer,
    btag: BTagProvider,
}

/// Per-event inputs shared by the fat-jet and jet loops.
struct EventInputs {
    rho: f64,
    forest: Option<TruthForest>,
    gen_jets: Vec<LorentzVector>,
    gen_fat_jets: Vec<LorentzVector>,
}

/// Calibrates, selects and labels jets and fat jets.
pub struct JetAnalyzer {
    config: JetAnalyzerConfig,
    corrector: EnergyCorrector,
    btag_cuts: WorkingPointCuts,
    simulation: Option<SimulationTools>,
}

fn gen_vectors(source: &dyn DataSource, collection: Collection) -> Vec<LorentzVector> {
    (0..source.size(collection))
        .map(|index| four_vector(source, collection, index))
        .collect()
}

impl JetAnalyzer {
    /// Loads every provider the job needs. Missing calibrations fail here,
    /// before the first event.
    pub fn new(
        config: JetAnalyzerConfig,
        era: &EraCalibration,
        is_data: bool,
        systematic: &Systematic,
        loader: Arc<dyn CalibrationLoader>,
    ) -> Result<Self, SkimError> {
        config.validate()?;
        let corrector = EnergyCorrector::new(era, is_data, systematic, loader.clone())?;
        let simulation = if is_data {
            None
        } else {
            let calibration = loader.btag(&resolve_descriptor(&era.btag_jet, None, JetKind::Ak4)?)?;
            Some(SimulationTools {
                smearer: ResolutionSmearer::new(era, systematic, loader.as_ref())?,
                btag: BTagProvider::new(calibration, era.btag_cuts, Flavor::B, systematic.is_nominal())?,
            })
        };
        info!(is_data, %systematic, "jet analyzer ready");
        Ok(Self {
            config,
            corrector,
            btag_cuts: era.btag_cuts,
            simulation,
        })
    }

    /// Cutflow weight of the event: the generator weight for simulation, 1
    /// for data.
    pub fn event_weight(&self, source: &dyn DataSource) -> f64 {
        match self.simulation {
            Some(_) => source.scalar(EventScalar::GenWeight),
            None => 1.0,
        }
    }

    /// Processes one event.
    ///
    /// Returns `None` when the early jet-count check already rejected every
    /// channel; the event is then not processed further.
    pub fn analyze(
        &mut self,
        source: &dyn DataSource,
        cutflow: &mut CutflowEvaluator,
        rng: &mut RngHandle,
    ) -> Result<Option<JetEventOutput>, SkimError> {
        if let Some(simulation) = &mut self.simulation {
            simulation.smearer.reset();
        }
        cutflow.early_jet_check(source.size(Collection::Jet));
        if cutflow.all_rejected() {
            debug!(run = source.run_number(), "every channel rejected before calibration");
            return Ok(None);
        }
        self.corrector.ensure_loaded(source.run_number())?;

        let inputs = EventInputs {
            rho: source.scalar(EventScalar::Rho),
            forest: self
                .simulation
                .as_ref()
                .map(|_| TruthForest::from_source(source)),
            gen_jets: gen_vectors(source, Collection::GenJet),
            gen_fat_jets: gen_vectors(source, Collection::GenFatJet),
        };
        let mut output = JetEventOutput {
            run: source.run_number(),
            ..JetEventOutput::default()
        };
        self.fat_jets(source, &inputs, &mut output, rng)?;
        self.jets(source, &inputs, &mut output, rng)?;
        cutflow.final_jet_check(output.jets.len(), output.subjets, output.fat_jets.len());
        Ok(Some(output))
    }

    /// Corrected and, for simulation, smeared four-momentum. The truth label
    /// must be read before the next call, which replaces the cached match.
    fn calibrate(
        &mut self,
        source: &dyn DataSource,
        inputs: &EventInputs,
        kind: JetKind,
        index: usize,
        rng: &mut RngHandle,
    ) -> Result<(LorentzVector, LorentzVector), SkimError> {
        let (collection, gen_jets) = match kind {
            JetKind::Ak4 => (Collection::Jet, &inputs.gen_jets),
            JetKind::Ak8 => (Collection::FatJet, &inputs.gen_fat_jets),
        };
        let raw = four_vector(source, collection, index);
        let area = source.value(collection, Field::Area, index);
        let corrected = raw * self.corrector.correct(&raw, inputs.rho, area, kind)?;
        let calibrated = match &mut self.simulation {
            Some(simulation) => {
                let factor = simulation.smearer.smear(
                    &corrected,
                    inputs.rho,
                    kind.cone_size(),
                    kind,
                    gen_jets,
                    rng,
                );
                corrected * factor
            }
            None => corrected,
        };
        Ok((raw, calibrated))
    }

    fn origin(&self, inputs: &EventInputs, kind: JetKind, target: i32) -> Option<OriginLabel> {
        let simulation = self.simulation.as_ref()?;
        let forest = inputs.forest.as_ref()?;
        Some(classify_origin(
            forest,
            simulation.smearer.matched_gen_jet(kind),
            target,
            kind,
        ))
    }

    fn fat_jets(
        &mut self,
        source: &dyn DataSource,
        inputs: &EventInputs,
        output: &mut JetEventOutput,
        rng: &mut RngHandle,
    ) -> Result<(), SkimError> {
        let count = source.size(Collection::FatJet);
        let mut constituents_of: Vec<Vec<usize>> = vec![Vec::new(); count];
        for constituent in 0..source.size(Collection::JetConstituent) {
            if let Some(owner) =
                index_field(source, Collection::JetConstituent, Field::FatJetIndex, constituent)
            {
                if let Some(list) = constituents_of.get_mut(owner) {
                    list.push(constituent);
                }
            }
        }

        for index in 0..count {
            let (_, p4) = self.calibrate(source, inputs, JetKind::Ak8, index, rng)?;
            if !(p4.pt() > self.config.fat_jet_pt_min
                && p4.mass() > self.config.fat_jet_mass_min
                && p4.eta().abs() < self.config.fat_jet_eta_max)
            {
                continue;
            }
            let origin = self.origin(inputs, JetKind::Ak8, self.config.fat_jet_truth_target);
            let value = |field| source.value(Collection::FatJet, field, index);
            let (hbb, top) = (value(Field::HbbScore), value(Field::TopScore));
            let out_index = output.fat_jets.len();

            output.constituents.extend(constituents_of[index].iter().map(|&constituent| {
                let read = |field| source.value(Collection::JetConstituent, field, constituent);
                ConstituentOutput {
                    p4: four_vector(source, Collection::JetConstituent, constituent),
                    vertex: [read(Field::Vx), read(Field::Vy), read(Field::Vz)],
                    charge: read(Field::Charge),
                    fat_jet_index: out_index,
                }
            }));
            for vertex in 0..source.size(Collection::SecondaryVertex) {
                let sv = four_vector(source, Collection::SecondaryVertex, vertex);
                if sv.delta_r(&p4) < self.config.vertex_radius {
                    let read = |field| source.value(Collection::SecondaryVertex, field, vertex);
                    output.vertices.push(VertexOutput {
                        p4: sv,
                        position: [read(Field::Vx), read(Field::Vy), read(Field::Vz)],
                        fat_jet_index: out_index,
                    });
                }
            }
            output.fat_jets.push(FatJetOutput {
                p4,
                njettiness: [value(Field::Tau1), value(Field::Tau2), value(Field::Tau3)],
                top_vs_higgs: if hbb + top != 0.0 { hbb / (hbb + top) } else { 0.0 },
                qcd_vs_higgs: value(Field::HbbVsQcd),
                origin,
            });
        }
        Ok(())
    }

    fn jets(
        &mut self,
        source: &dyn DataSource,
        inputs: &EventInputs,
        output: &mut JetEventOutput,
        rng: &mut RngHandle,
    ) -> Result<(), SkimError> {
        let met_pt = source.scalar(EventScalar::MetPt);
        let met_phi = source.scalar(EventScalar::MetPhi);
        let (mut met_px, mut met_py) = (met_pt * met_phi.cos(), met_pt * met_phi.sin());

        for index in 0..source.size(Collection::Jet) {
            let (raw, p4) = self.calibrate(source, inputs, JetKind::Ak4, index, rng)?;
            met_px += raw.px() - p4.px();
            met_py += raw.py() - p4.py();
            if !(p4.pt() > self.config.jet_pt_min && p4.eta().abs() < self.config.jet_eta_max) {
                continue;
            }

            let discriminant = source.value(Collection::Jet, Field::BTagDiscriminant, index);
            let btag_sf = self.simulation.as_ref().map(|simulation| {
                let sf = |wp| simulation.btag.scale_factors(wp, p4.eta().abs(), p4.pt());
                BTagScaleFactors {
                    loose: sf(WorkingPoint::Loose),
                    medium: sf(WorkingPoint::Medium),
                    tight: sf(WorkingPoint::Tight),
                }
            });
            let origin = self.origin(inputs, JetKind::Ak4, self.config.jet_truth_target);
            let fat_jet_index = output
                .fat_jets
                .iter()
                .position(|fat| p4.delta_r(&fat.p4) < self.config.association_radius);
            if fat_jet_index.is_some() {
                output.subjets += 1;
            }
            output.ht += p4.pt();
            output.jets.push(JetOutput {
                p4,
                is_loose_b: self.btag_cuts.passes(WorkingPoint::Loose, discriminant),
                is_medium_b: self.btag_cuts.passes(WorkingPoint::Medium, discriminant),
                is_tight_b: self.btag_cuts.passes(WorkingPoint::Tight, discriminant),
                btag_sf,
                origin,
                fat_jet_index: fat_jet_index.map_or(-1, |position| position as i32),
            });
        }
        output.met_px = met_px;
        output.met_py = met_py;
        Ok(())
    }
}
