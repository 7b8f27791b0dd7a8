use std::collections::BTreeSet;

use skim_source::columnar::branch_name;
use skim_source::{
    four_vector, index_field, Candidate, ColumnarEvent, Collection, DataSource, EventScalar, Field,
    GenParticleRecord, ObjectEvent, ObjectRecord, RecoFatJet, RecoJet,
};

fn object_event() -> ObjectEvent {
    let record = ObjectRecord {
        run: 297050,
        rho: 21.5,
        met_pt: 40.0,
        met_phi: 0.3,
        gen_weight: 1.0,
        jets: vec![RecoJet {
            pt: 45.0,
            eta: 0.5,
            phi: 1.0,
            mass: 6.0,
            area: 0.5,
            prob_b: 0.4,
            prob_bb: 0.1,
            prob_lepb: 0.05,
        }],
        fat_jets: vec![RecoFatJet {
            pt: 250.0,
            eta: 0.1,
            phi: -1.0,
            mass: 90.0,
            area: 2.0,
            prob_top: [0.1, 0.1, 0.05, 0.05],
            daughters: vec![
                Candidate {
                    pt: 10.0,
                    ..Candidate::default()
                },
                Candidate {
                    pt: 20.0,
                    daughters: vec![
                        Candidate {
                            pt: 12.0,
                            charge: 1.0,
                            ..Candidate::default()
                        },
                        Candidate {
                            pt: 8.0,
                            charge: -1.0,
                            ..Candidate::default()
                        },
                    ],
                    ..Candidate::default()
                },
            ],
            ..RecoFatJet::default()
        }],
        gen_particles: vec![
            GenParticleRecord {
                pdg_id: 25,
                parent: None,
                ..GenParticleRecord::default()
            },
            GenParticleRecord {
                pdg_id: -5,
                parent: Some(0),
                ..GenParticleRecord::default()
            },
        ],
        ..ObjectRecord::default()
    };
    ObjectEvent::from(record)
}

fn columnar_event() -> ColumnarEvent {
    ColumnarEvent::new(297050)
        .with_scalar(EventScalar::Rho, 21.5)
        .with_scalar(EventScalar::MetPt, 40.0)
        .with_scalar(EventScalar::MetPhi, 0.3)
        .with_column(Collection::Jet, Field::Pt, vec![45.0])
        .with_column(Collection::Jet, Field::Eta, vec![0.5])
        .with_column(Collection::Jet, Field::Phi, vec![1.0])
        .with_column(Collection::Jet, Field::Mass, vec![6.0])
        .with_column(Collection::Jet, Field::Area, vec![0.5])
        .with_column(Collection::Jet, Field::BTagDiscriminant, vec![0.55])
        .with_column(Collection::FatJet, Field::Pt, vec![250.0])
        .with_column(Collection::FatJet, Field::Eta, vec![0.1])
        .with_column(Collection::FatJet, Field::Phi, vec![-1.0])
        .with_column(Collection::FatJet, Field::Mass, vec![90.0])
        .with_column(Collection::FatJet, Field::Area, vec![2.0])
        .with_column(Collection::FatJet, Field::TopScore, vec![0.3])
        .with_column(Collection::GenParticle, Field::PdgId, vec![25.0, -5.0])
        .with_column(Collection::GenParticle, Field::ParentIndex, vec![-1.0, 0.0])
}

#[test]
fn backends_answer_the_same_questions() {
    let object = object_event();
    let columnar = columnar_event();
    let sources: [&dyn DataSource; 2] = [&object, &columnar];

    for source in sources {
        assert_eq!(source.run_number(), 297050);
        assert_eq!(source.size(Collection::Jet), 1);
        assert_eq!(source.size(Collection::FatJet), 1);
        assert_eq!(source.size(Collection::GenParticle), 2);
        assert!((source.value(Collection::Jet, Field::BTagDiscriminant, 0) - 0.55).abs() < 1e-12);
        assert!((source.value(Collection::FatJet, Field::TopScore, 0) - 0.3).abs() < 1e-12);
        assert_eq!(source.scalar(EventScalar::GenWeight), 1.0);
        assert_eq!(index_field(source, Collection::GenParticle, Field::ParentIndex, 0), None);
        assert_eq!(index_field(source, Collection::GenParticle, Field::ParentIndex, 1), Some(0));
        let jet = four_vector(source, Collection::Jet, 0);
        assert_eq!(jet.pt(), 45.0);
    }
}

#[test]
fn object_backend_flattens_composite_daughters() {
    let event = object_event();
    assert_eq!(event.size(Collection::JetConstituent), 3);
    let pts: Vec<f64> = (0..3)
        .map(|i| event.value(Collection::JetConstituent, Field::Pt, i))
        .collect();
    assert_eq!(pts, vec![10.0, 12.0, 8.0]);
    assert_eq!(event.value(Collection::JetConstituent, Field::FatJetIndex, 2), 0.0);
    assert_eq!(event.value(Collection::JetConstituent, Field::Charge, 2), -1.0);
}

#[test]
fn columnar_validation_rejects_missing_and_ragged_columns() {
    let event = columnar_event();
    assert!(event.validate(true).is_ok());

    let err = event.validate(false).unwrap_err();
    assert_eq!(err.info().code, "missing-column");

    let ragged = columnar_event().with_column(Collection::Jet, Field::Eta, vec![0.5, 0.7]);
    let err = ragged.validate(true).unwrap_err();
    assert_eq!(err.info().code, "ragged-collection");
}

#[test]
fn columnar_event_round_trips_json() {
    let event = columnar_event();
    let json = serde_json::to_string(&event).unwrap();
    let decoded: ColumnarEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn absent_index_fields_read_as_minus_one_in_both_backends() {
    let object = object_event();
    let columnar = columnar_event();
    let sources: [&dyn DataSource; 2] = [&object, &columnar];

    for source in sources {
        assert_eq!(source.value(Collection::Jet, Field::FatJetIndex, 0), -1.0);
        assert_eq!(source.value(Collection::FatJet, Field::ParentIndex, 0), -1.0);
        assert_eq!(source.value(Collection::GenParticle, Field::FatJetIndex, 1), -1.0);
        assert_eq!(index_field(source, Collection::Jet, Field::FatJetIndex, 0), None);
        assert_eq!(source.value(Collection::Jet, Field::Tau1, 0), 0.0);
    }
    assert_eq!(object.value(Collection::JetConstituent, Field::ParentIndex, 0), -1.0);
}

#[test]
fn branch_names_are_distinct_and_stable() {
    assert_eq!(branch_name(Collection::GenFatJet, Field::Pt), "GenJetAK8_pt");
    assert_eq!(branch_name(Collection::Jet, Field::BTagDiscriminant), "Jet_btagDeepFlavB");
    assert_eq!(
        branch_name(Collection::GenParticle, Field::ParentIndex),
        "GenPart_genPartIdxMother"
    );
    let names: BTreeSet<String> = Collection::ALL
        .iter()
        .flat_map(|&collection| Field::ALL.iter().map(move |&field| branch_name(collection, field)))
        .collect();
    assert_eq!(names.len(), Collection::ALL.len() * Field::ALL.len());
}
