use std::f64::consts::PI;

use proptest::prelude::*;
use skim_core::{delta_phi, delta_r, LorentzVector};

#[test]
fn cartesian_round_trip_preserves_components() {
    let lv = LorentzVector::from_pt_eta_phi_m(200.0, 0.1, 0.5, 60.0);
    let back = LorentzVector::from_cartesian(lv.energy(), lv.px(), lv.py(), lv.pz());
    assert!((back.pt() - 200.0).abs() < 1e-9);
    assert!((back.eta() - 0.1).abs() < 1e-9);
    assert!((back.phi() - 0.5).abs() < 1e-9);
    assert!((back.mass() - 60.0).abs() < 1e-6);
}

#[test]
fn scaling_keeps_direction() {
    let lv = LorentzVector::from_pt_eta_phi_m(50.0, -1.2, 2.0, 5.0);
    let scaled = lv * 1.1;
    assert!((scaled.pt() - 55.0).abs() < 1e-12);
    assert!((scaled.mass() - 5.5).abs() < 1e-12);
    assert_eq!(scaled.eta(), lv.eta());
    assert_eq!(scaled.phi(), lv.phi());
    assert!((scaled.energy() - 1.1 * lv.energy()).abs() < 1e-9);
}

#[test]
fn delta_phi_wraps_across_pi() {
    let d = delta_phi(PI - 0.1, -PI + 0.1);
    assert!((d + 0.2).abs() < 1e-12);
    assert!((delta_r(0.0, PI - 0.1, 0.0, -PI + 0.1) - 0.2).abs() < 1e-12);
}

proptest! {
    #[test]
    fn delta_phi_stays_in_range(a in -10.0f64..10.0, b in -10.0f64..10.0) {
        let d = delta_phi(a, b);
        prop_assert!(d >= -PI - 1e-12 && d < PI + 1e-12);
    }

    #[test]
    fn delta_r_is_symmetric(ea in -3.0f64..3.0, pa in -4.0f64..4.0, eb in -3.0f64..3.0, pb in -4.0f64..4.0) {
        let forward = delta_r(ea, pa, eb, pb);
        let backward = delta_r(eb, pb, ea, pa);
        prop_assert!((forward - backward).abs() < 1e-9);
    }
}
