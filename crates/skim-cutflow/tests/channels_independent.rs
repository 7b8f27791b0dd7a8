use skim_cutflow::{jet_requirement_label, ChannelConfig, CutflowEvaluator, NO_CUTS_LABEL};

fn evaluator() -> CutflowEvaluator {
    CutflowEvaluator::new(vec![
        ChannelConfig::new("4j0fj", 4, 0),
        ChannelConfig::new("2j1fj", 2, 1),
        ChannelConfig {
            scale: 0.5,
            ..ChannelConfig::new("2j1fj_half", 2, 1)
        },
    ])
    .expect("valid channels")
}

#[test]
fn every_event_fills_no_cuts_with_the_scaled_weight() {
    let mut cutflow = evaluator();
    cutflow.begin_event(2.0);
    cutflow.begin_event(1.0);
    let report = cutflow.into_report();
    let first = report.channels[0].bin(NO_CUTS_LABEL).expect("filled");
    assert_eq!(first.entries, 2);
    assert!((first.sum_weights - 3.0).abs() < 1e-12);
    let half = report.channels[2].bin(NO_CUTS_LABEL).expect("filled");
    assert!((half.sum_weights - 1.5).abs() < 1e-12);
    assert!((half.sum_weights_sq - 1.25).abs() < 1e-12);
}

#[test]
fn failing_one_channel_leaves_the_others_alive() {
    let mut cutflow = evaluator();
    cutflow.begin_event(1.0);
    cutflow.early_jet_check(3);
    assert!(!cutflow.channels()[0].is_alive());
    assert!(cutflow.channels()[1].is_alive());
    assert!(!cutflow.all_rejected());

    let filled = cutflow.final_jet_check(3, 1, 1);
    assert_eq!(filled, 2);
    let label = jet_requirement_label(2, 1);
    assert_eq!(label, "N^{AK4}_{jet} >= 2 && N^{AK8}_{jet} == 1");
    assert_eq!(cutflow.channels()[1].histogram().bin(&label).map(|bin| bin.entries), Some(1));
    assert!(cutflow.channels()[0].histogram().bin(&jet_requirement_label(4, 0)).is_none());
}

#[test]
fn rejected_channels_are_revived_next_event() {
    let mut cutflow = evaluator();
    cutflow.begin_event(1.0);
    cutflow.early_jet_check(0);
    assert!(cutflow.all_rejected());
    assert_eq!(cutflow.final_jet_check(6, 0, 0), 0);

    cutflow.begin_event(1.0);
    assert!(cutflow.channels().iter().all(|channel| channel.is_alive()));
    assert_eq!(cutflow.final_jet_check(6, 0, 0), 1);
}

#[test]
fn fat_jet_count_must_match_exactly() {
    let mut cutflow = evaluator();
    cutflow.begin_event(1.0);
    assert_eq!(cutflow.final_jet_check(5, 0, 2), 0);
    assert!(cutflow.all_rejected());
}

#[test]
fn subjets_do_not_count_as_independent_jets() {
    let mut cutflow = evaluator();
    cutflow.begin_event(1.0);
    assert_eq!(cutflow.final_jet_check(4, 1, 0), 0);
    cutflow.begin_event(1.0);
    assert_eq!(cutflow.final_jet_check(4, 0, 0), 1);
}

#[test]
fn bins_keep_creation_order() {
    let mut cutflow = evaluator();
    cutflow.begin_event(1.0);
    cutflow.final_jet_check(2, 0, 1);
    let report = cutflow.into_report();
    let labels: Vec<_> = report.channels[1].labels().collect();
    assert_eq!(labels, vec![NO_CUTS_LABEL, "N^{AK4}_{jet} >= 2 && N^{AK8}_{jet} == 1"]);
    let json = serde_json::to_string(&report).expect("serializes");
    assert!(json.find("No cuts") < json.find("N^{AK4}"));
}

#[test]
fn invalid_channel_sets_are_config_errors() {
    let err = CutflowEvaluator::new(vec![]).expect_err("empty");
    assert_eq!(err.info().code, "no-channels");
    let err = CutflowEvaluator::new(vec![ChannelConfig::new("a", 1, 0), ChannelConfig::new("a", 2, 0)])
        .expect_err("duplicate");
    assert_eq!(err.info().code, "duplicate-channel");
}

#[test]
fn channel_config_rejects_thresholds_it_does_not_apply() {
    let parsed: ChannelConfig = serde_json::from_str(r#"{"name":"2j","min_jets":2}"#).unwrap();
    assert_eq!(parsed, ChannelConfig::new("2j", 2, 0));

    let unknown = serde_json::from_str::<ChannelConfig>(r#"{"name":"1e","min_electrons":1}"#);
    assert!(unknown.is_err());
}
