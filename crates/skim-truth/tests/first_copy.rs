use proptest::prelude::*;
use skim_core::LorentzVector;
use skim_truth::{TruthForest, TruthParticle};

fn particle(species: i32, parent: Option<usize>) -> TruthParticle {
    TruthParticle {
        species,
        status: 1,
        momentum: LorentzVector::default(),
        parent,
    }
}

#[test]
fn walks_to_earliest_same_species_copy() {
    // 0: H(25) -> 1: b -> 2: b (radiative copy) -> 3: b
    let forest = TruthForest::new(vec![
        particle(25, None),
        particle(5, Some(0)),
        particle(5, Some(1)),
        particle(-5, Some(2)),
    ]);
    assert_eq!(forest.first_copy(3, 5), 1);
    assert_eq!(forest.first_copy(2, 5), 1);
    assert_eq!(forest.first_copy(1, 5), 1);
}

#[test]
fn fails_closed_on_other_species_or_bad_index() {
    let forest = TruthForest::new(vec![particle(25, None), particle(5, Some(0))]);
    assert_eq!(forest.first_copy(0, 5), 0);
    assert_eq!(forest.first_copy(1, 6), 1);
    assert_eq!(forest.first_copy(17, 5), 17);
}

#[test]
fn malformed_links_terminate_walks() {
    let forest = TruthForest::new(vec![
        particle(5, Some(0)),
        particle(5, Some(99)),
        particle(5, Some(3)),
        particle(5, Some(2)),
    ]);
    assert_eq!(forest.parent(0), None);
    assert_eq!(forest.parent(1), None);
    assert_eq!(forest.first_copy(0, 5), 0);
    assert_eq!(forest.first_copy(1, 5), 1);
    // Two-node cycle: both members resolve to the lower index.
    assert_eq!(forest.first_copy(2, 5), 2);
    assert_eq!(forest.first_copy(3, 5), 2);
    assert!(forest.ancestors(2).count() <= forest.len());
}

#[test]
fn same_species_loop_resolves_to_one_node() {
    let forest = TruthForest::new(vec![
        particle(25, None),
        particle(5, Some(2)),
        particle(-5, Some(1)),
    ]);
    let once = forest.first_copy(1, 5);
    assert_eq!(once, 1);
    assert_eq!(forest.first_copy(once, 5), once);
    assert_eq!(forest.first_copy(2, 5), 1);
}

#[test]
fn chain_entering_a_loop_lands_on_the_loop() {
    // 3 -> 2 -> 1 -> 2: the tail at 3 joins the loop {1, 2}.
    let forest = TruthForest::new(vec![
        particle(25, None),
        particle(5, Some(2)),
        particle(5, Some(1)),
        particle(5, Some(2)),
    ]);
    assert_eq!(forest.first_copy(3, 5), 1);
    assert_eq!(forest.first_copy(1, 5), 1);
}

fn forest_strategy() -> impl Strategy<Value = TruthForest> {
    prop::collection::vec((prop::sample::select(vec![5, -5, 6, 15, 25, 37]), any::<u16>()), 1..40)
        .prop_map(|raw| {
            // Parents may point anywhere in the arena, so loops are generated too.
            let len = raw.len();
            let particles = raw
                .into_iter()
                .map(|(species, link)| {
                    let parent = if link % 5 == 0 {
                        None
                    } else {
                        Some(link as usize % len)
                    };
                    particle(species, parent)
                })
                .collect();
            TruthForest::new(particles)
        })
}

proptest! {
    #[test]
    fn first_copy_is_a_fixed_point(forest in forest_strategy(), start in 0usize..40, species in prop::sample::select(vec![5, 6, 15, 25])) {
        let once = forest.first_copy(start, species);
        let twice = forest.first_copy(once, species);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn first_copy_never_changes_species(forest in forest_strategy(), start in 0usize..40, species in prop::sample::select(vec![5, 6, 15, 25])) {
        let copy = forest.first_copy(start, species);
        if let (Some(origin), Some(found)) = (forest.get(start), forest.get(copy)) {
            if origin.is_species(species) {
                prop_assert!(found.is_species(species));
            } else {
                prop_assert_eq!(copy, start);
            }
        }
    }
}
