mod common;

use skim_calib::{CalibrationBundle, CalibrationLoader, CorrectionLevel};

#[test]
fn json_bundles_are_validated_on_read() {
    let bundle = common::bundle();
    let bytes = serde_json::to_vec(&bundle).expect("serializes");
    let reread = CalibrationBundle::from_json_slice(&bytes).expect("valid bundle");
    assert_eq!(reread, bundle);

    let mut broken = common::bundle();
    broken.resolutions.values_mut().for_each(|table| table.parameters.clear());
    let bytes = serde_json::to_vec(&broken).expect("serializes");
    let err = CalibrationBundle::from_json_slice(&bytes).expect_err("shape mismatch");
    assert_eq!(err.info().code, "malformed-table");
}

#[test]
fn unknown_descriptors_are_errors() {
    let bundle = common::bundle();
    assert!(!bundle.contains("Summer16_L1FastJet_AK4"));
    let err = bundle.correction_level("Summer16_L1FastJet_AK4").expect_err("absent");
    assert_eq!(err.info().code, "missing-descriptor");
    assert!(bundle.btag("nope").is_err());
    assert!(bundle.resolution("nope").is_err());
}

#[test]
fn binned_levels_clamp_to_the_grid() {
    let level = common::relative();
    assert_eq!(level.factor(10.0, 0.0, 0.0, 0.0), 1.10);
    assert_eq!(level.factor(49.999, 9.0, 0.0, 0.0), 1.10);
    assert_eq!(level.factor(50.0, -9.0, 0.0, 0.0), 1.05);
    assert_eq!(level.factor(1.0e6, 0.0, 0.0, 0.0), 1.05);
    assert_eq!(level.factor(f64::NAN, 0.0, 0.0, 0.0), 1.10);
}

#[test]
fn pileup_offset_is_floored() {
    let level = common::pileup();
    assert_eq!(level.factor(0.0, 0.0, 10.0, 0.5), 1e-4);
    assert_eq!(level.factor(1.0, 0.0, 10.0, 0.5), 1e-4);
    assert!((level.factor(100.0, 0.0, 10.0, 0.5) - 0.975).abs() < 1e-12);
}
