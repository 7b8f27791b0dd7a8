#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use skim_calib::{
    BTagCalibration, BTagEntry, BinnedTable, CalibrationBundle, CorrectionTable, EraCalibration,
    Flavor, ResolutionTable, RunRange, ScaleFactorTable, Systematic, UncertaintyTable,
    WorkingPoint, WorkingPointCuts,
};
use skim_core::{JetKind, Variation};
use skim_cutflow::{ChannelConfig, CutflowEvaluator};
use skim_jet::{JetAnalyzer, JetAnalyzerConfig};

pub const DATA_RUN: u32 = 297100;

pub fn era() -> EraCalibration {
    let mut run_eras = BTreeMap::new();
    run_eras.insert("B".to_owned(), RunRange(297046, 299329));
    EraCalibration {
        run_eras,
        jec_mc: vec!["MC_L1_&".to_owned(), "MC_L3_&".to_owned()],
        jec_data: vec!["Run@_L1_&".to_owned(), "Run@_L3_&".to_owned()],
        jec_uncertainty: "MC_Unc_&".to_owned(),
        jer_resolution: "MC_Reso_&".to_owned(),
        jer_scale_factor: "MC_SF_&".to_owned(),
        btag_jet: "DeepFlavour".to_owned(),
        btag_cuts: WorkingPointCuts {
            loose: 0.051,
            medium: 0.3033,
            tight: 0.7489,
        },
    }
}

fn flat(value: f64) -> BinnedTable {
    BinnedTable {
        eta_edges: vec![-5.0, 5.0],
        pt_edges: vec![0.0, 7000.0],
        values: vec![value],
        abs_eta: false,
    }
}

fn btag() -> BTagCalibration {
    let mut entries = Vec::new();
    for (wp, value) in [
        (WorkingPoint::Loose, 1.0),
        (WorkingPoint::Medium, 0.95),
        (WorkingPoint::Tight, 0.9),
    ] {
        for (variation, shift) in [(None, 0.0), (Some(Variation::Up), 0.05), (Some(Variation::Down), -0.05)] {
            entries.push(BTagEntry {
                working_point: wp,
                flavor: Flavor::B,
                variation,
                eta_min: 0.0,
                eta_max: 2.5,
                pt_min: 20.0,
                pt_max: 1000.0,
                value: value + shift,
            });
        }
    }
    BTagCalibration { entries }
}

/// Calibration whose only non-trivial levels are a flat absolute scale and a
/// flat resolution scale factor.
pub fn bundle(absolute_scale: f64, resolution_sf: f64) -> CalibrationBundle {
    let mut bundle = CalibrationBundle::default();
    for kind in JetKind::ALL {
        let label = kind.label();
        for prefix in ["MC", "RunB"] {
            bundle.corrections.insert(
                format!("{prefix}_L1_{label}"),
                CorrectionTable::PileupOffset {
                    eta_edges: vec![-5.0, 5.0],
                    offset: vec![0.0],
                    floor: 1e-4,
                },
            );
            bundle.corrections.insert(
                format!("{prefix}_L3_{label}"),
                CorrectionTable::Binned {
                    table: flat(absolute_scale),
                    floor: 1e-4,
                },
            );
        }
        let mut sources = BTreeMap::new();
        sources.insert(
            "Total".to_owned(),
            UncertaintyTable {
                up: flat(0.04),
                down: flat(0.04),
            },
        );
        bundle.uncertainties.insert(format!("MC_Unc_{label}"), sources);
        bundle.resolutions.insert(
            format!("MC_Reso_{label}"),
            ResolutionTable {
                eta_edges: vec![-5.0, 5.0],
                rho_edges: vec![0.0, 100.0],
                parameters: vec![[0.0, 0.0, 0.1]],
                pt_range: [10.0, 6500.0],
            },
        );
        bundle.scale_factors.insert(
            format!("MC_SF_{label}"),
            ScaleFactorTable {
                eta_edges: vec![0.0, 5.0],
                nominal: vec![resolution_sf],
                up: vec![resolution_sf + 0.1],
                down: vec![resolution_sf - 0.1],
                abs_eta: true,
            },
        );
    }
    bundle.btag.insert("DeepFlavour".to_owned(), btag());
    bundle
}

pub fn analyzer_with(bundle: CalibrationBundle, is_data: bool, systematic: &str) -> JetAnalyzer {
    let systematic: Systematic = systematic.parse().expect("valid systematic");
    JetAnalyzer::new(
        JetAnalyzerConfig::default(),
        &era(),
        is_data,
        &systematic,
        Arc::new(bundle),
    )
    .unwrap_or_else(|err| panic!("analyzer builds: {err}"))
}

/// Identity calibration: corrected and smeared jets equal the raw ones.
pub fn analyzer(is_data: bool) -> JetAnalyzer {
    analyzer_with(bundle(1.0, 1.0), is_data, "")
}

pub fn cutflow(min_jets: usize, fat_jets: usize) -> CutflowEvaluator {
    CutflowEvaluator::new(vec![ChannelConfig::new("probe", min_jets, fat_jets)]).expect("valid")
}
