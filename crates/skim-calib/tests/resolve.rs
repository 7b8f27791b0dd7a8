mod common;

use skim_calib::{resolve_descriptor, resolve_run_label, RunContext};
use skim_core::JetKind;

#[test]
fn substitutes_kind_and_run_labels() {
    let resolved = resolve_descriptor("Fall17_Run@_L2Relative_&PFchs", Some("DE"), JetKind::Ak8)
        .expect("resolves");
    assert_eq!(resolved, "Fall17_RunDE_L2Relative_AK8PFchs");
    let resolved = resolve_descriptor("Fall17_MC_SF_&", None, JetKind::Ak4).expect("resolves");
    assert_eq!(resolved, "Fall17_MC_SF_AK4");
}

#[test]
fn run_placeholder_without_label_is_fatal() {
    let err = resolve_descriptor("Run@_L1", None, JetKind::Ak4).expect_err("needs label");
    assert_eq!(err.info().code, "unresolved-run-label");
    assert_eq!(err.info().context.get("descriptor").map(String::as_str), Some("Run@_L1"));
}

#[test]
fn run_ranges_are_inclusive() {
    let era = common::era();
    assert_eq!(resolve_run_label(&era, 297046), Some("B"));
    assert_eq!(resolve_run_label(&era, 299329), Some("B"));
    assert_eq!(resolve_run_label(&era, 299368), Some("C"));
    assert_eq!(resolve_run_label(&era, 299340), None);
}

#[test]
fn data_runs_outside_every_range_are_rejected() {
    let era = common::era();
    let context = RunContext {
        is_data: true,
        run: Some(1),
    };
    let err = era.resolve_all(&context).expect_err("run 1 is in no range");
    assert_eq!(err.info().code, "run-outside-eras");
}

#[test]
fn resolve_all_lists_data_chain_with_residual() {
    let era = common::era();
    let context = RunContext {
        is_data: true,
        run: Some(300000),
    };
    let resolved = era.resolve_all(&context).expect("resolves");
    assert_eq!(resolved.run_label.as_deref(), Some("C"));
    assert_eq!(resolved.jec_levels.ak4.len(), 4);
    assert_eq!(resolved.jec_levels.ak8[3], "Fall17_RunC_L2L3Residual_AK8");
    assert_eq!(resolved.jer_scale_factor.ak8, "Fall17_MC_SF_AK8");
    assert_eq!(resolved.btag_jet, "DeepFlavour_94XSF");
}

#[test]
fn simulation_ignores_run_ranges() {
    let era = common::era();
    let context = RunContext {
        is_data: false,
        run: Some(1),
    };
    let resolved = era.resolve_all(&context).expect("resolves");
    assert_eq!(resolved.run_label, None);
    assert_eq!(resolved.jec_levels.ak4[0], "Fall17_MC_L1FastJet_AK4");
}
