#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use skim_calib::{
    BTagCalibration, BTagEntry, BinnedTable, CalibrationBundle, CalibrationLoader, CorrectionTable,
    EraCalibration, Flavor, ResolutionTable, RunRange, ScaleFactorTable, UncertaintyTable,
    WorkingPoint, WorkingPointCuts,
};
use skim_core::{JetKind, Variation};

pub const RHO: f64 = 10.0;
pub const AREA: f64 = 0.5;
pub const OFFSET_DENSITY: f64 = 0.5;
pub const RESOLUTION: f64 = 0.1;

pub fn era() -> EraCalibration {
    let mut run_eras = BTreeMap::new();
    run_eras.insert("B".to_owned(), RunRange(297046, 299329));
    run_eras.insert("C".to_owned(), RunRange(299368, 302029));
    EraCalibration {
        run_eras,
        jec_mc: vec![
            "Fall17_MC_L1FastJet_&".to_owned(),
            "Fall17_MC_L2Relative_&".to_owned(),
            "Fall17_MC_L3Absolute_&".to_owned(),
        ],
        jec_data: vec![
            "Fall17_Run@_L1FastJet_&".to_owned(),
            "Fall17_Run@_L2Relative_&".to_owned(),
            "Fall17_Run@_L3Absolute_&".to_owned(),
            "Fall17_Run@_L2L3Residual_&".to_owned(),
        ],
        jec_uncertainty: "Fall17_MC_Uncertainty_&".to_owned(),
        jer_resolution: "Fall17_MC_PtResolution_&".to_owned(),
        jer_scale_factor: "Fall17_MC_SF_&".to_owned(),
        btag_jet: "DeepFlavour_94XSF".to_owned(),
        btag_cuts: WorkingPointCuts {
            loose: 0.051,
            medium: 0.3033,
            tight: 0.7489,
        },
    }
}

pub fn flat(value: f64) -> BinnedTable {
    BinnedTable {
        eta_edges: vec![-5.0, 5.0],
        pt_edges: vec![0.0, 7000.0],
        values: vec![value],
        abs_eta: false,
    }
}

pub fn binned(table: BinnedTable) -> CorrectionTable {
    CorrectionTable::Binned { table, floor: 1e-4 }
}

pub fn pileup() -> CorrectionTable {
    CorrectionTable::PileupOffset {
        eta_edges: vec![-5.0, 5.0],
        offset: vec![OFFSET_DENSITY],
        floor: 1e-4,
    }
}

/// Relative level switching from 1.10 to 1.05 at pt = 50.
pub fn relative() -> CorrectionTable {
    binned(BinnedTable {
        eta_edges: vec![-5.0, 5.0],
        pt_edges: vec![0.0, 50.0, 7000.0],
        values: vec![1.10, 1.05],
        abs_eta: false,
    })
}

pub fn scale_factors(nominal: f64, up: f64, down: f64) -> ScaleFactorTable {
    ScaleFactorTable {
        eta_edges: vec![0.0, 5.0],
        nominal: vec![nominal],
        up: vec![up],
        down: vec![down],
        abs_eta: true,
    }
}

fn btag_value(wp: WorkingPoint, variation: Option<Variation>, eta_bin: usize, pt_bin: usize) -> f64 {
    let base = match wp {
        WorkingPoint::Loose => 1.00,
        WorkingPoint::Medium => 0.95,
        WorkingPoint::Tight => 0.90,
    };
    let shift = match variation {
        None => 0.0,
        Some(Variation::Up) => 0.05,
        Some(Variation::Down) => -0.05,
    };
    base + shift + 0.01 * eta_bin as f64 + 0.001 * pt_bin as f64
}

pub fn btag_calibration() -> BTagCalibration {
    let eta_bins = [(0.0, 1.2), (1.2, 2.5)];
    let pt_bins = [(20.0, 100.0), (100.0, 1000.0)];
    let mut entries = Vec::new();
    for wp in WorkingPoint::ALL {
        for variation in [None, Some(Variation::Up), Some(Variation::Down)] {
            for (eta_bin, (eta_min, eta_max)) in eta_bins.iter().enumerate() {
                for (pt_bin, (pt_min, pt_max)) in pt_bins.iter().enumerate() {
                    entries.push(BTagEntry {
                        working_point: wp,
                        flavor: Flavor::B,
                        variation,
                        eta_min: *eta_min,
                        eta_max: *eta_max,
                        pt_min: *pt_min,
                        pt_max: *pt_max,
                        value: btag_value(wp, variation, eta_bin, pt_bin),
                    });
                }
            }
        }
    }
    BTagCalibration { entries }
}

pub fn bundle() -> CalibrationBundle {
    let mut bundle = CalibrationBundle::default();
    for kind in JetKind::ALL {
        let label = kind.label();
        bundle.corrections.insert(format!("Fall17_MC_L1FastJet_{label}"), pileup());
        bundle.corrections.insert(format!("Fall17_MC_L2Relative_{label}"), relative());
        bundle
            .corrections
            .insert(format!("Fall17_MC_L3Absolute_{label}"), binned(flat(1.02)));
        for (run_label, residual) in [("B", 0.98), ("C", 0.99)] {
            bundle
                .corrections
                .insert(format!("Fall17_Run{run_label}_L1FastJet_{label}"), pileup());
            bundle
                .corrections
                .insert(format!("Fall17_Run{run_label}_L2Relative_{label}"), relative());
            bundle
                .corrections
                .insert(format!("Fall17_Run{run_label}_L3Absolute_{label}"), binned(flat(1.02)));
            bundle.corrections.insert(
                format!("Fall17_Run{run_label}_L2L3Residual_{label}"),
                binned(flat(residual)),
            );
        }
        let mut sources = BTreeMap::new();
        sources.insert(
            "Total".to_owned(),
            UncertaintyTable {
                up: flat(0.03),
                down: flat(0.02),
            },
        );
        bundle.uncertainties.insert(format!("Fall17_MC_Uncertainty_{label}"), sources);
        bundle.resolutions.insert(
            format!("Fall17_MC_PtResolution_{label}"),
            ResolutionTable {
                eta_edges: vec![-5.0, 5.0],
                rho_edges: vec![0.0, 100.0],
                parameters: vec![[0.0, 0.0, RESOLUTION]],
                pt_range: [10.0, 6500.0],
            },
        );
        bundle
            .scale_factors
            .insert(format!("Fall17_MC_SF_{label}"), scale_factors(1.2, 1.3, 1.1));
    }
    bundle.btag.insert("DeepFlavour_94XSF".to_owned(), btag_calibration());
    bundle
}

pub fn loader() -> Arc<dyn CalibrationLoader> {
    Arc::new(bundle())
}
