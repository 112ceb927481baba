//! Property-based tests for the invariants of the index.

use leveled_range_index::{IndexConfig, RangeIndex};
use proptest::prelude::*;

/// Keys paired with the level they are inserted on.
fn insertions() -> impl Strategy<Value = Vec<(i64, usize)>> {
    prop::collection::vec((-100i64..100, 1usize..=4), 1..64)
}

fn build(input: &[(i64, usize)]) -> RangeIndex<i64> {
    let mut index = RangeIndex::with_config(IndexConfig::default().check_invariants(true));
    for (key, level) in input {
        index.insert_at(*key, *level).unwrap();
    }
    index
}

proptest! {
    #[test]
    fn pointer_count(input in insertions()) {
        let index = build(&input);
        for level in 1..=index.height() {
            for id in index.gather_level(level).unwrap() {
                let node = index.node(id).unwrap();
                let n = node.keys().len();
                let expected = if n == 1 { 2 } else { 2 * n - 1 };
                prop_assert_eq!(expected, node.range_pointers().len());
                prop_assert_eq!(2, node.range_pointers().iter().filter(|r| r.is_boundary()).count());
                prop_assert!(node.range_pointers().iter().all(|r| r.owner() == id));
            }
        }
    }

    #[test]
    fn every_value_is_routed(input in insertions(), probes in prop::collection::vec(any::<i64>(), 1..32)) {
        let index = build(&input);
        for level in 1..=index.height() {
            for id in index.gather_level(level).unwrap() {
                let node = index.node(id).unwrap();
                for v in &probes {
                    prop_assert!(node.route(v).is_some());
                }
            }
        }
    }

    #[test]
    fn levels_increase_by_one(input in insertions()) {
        let index = build(&input);
        for level in 2..=index.height() {
            for id in index.gather_level(level).unwrap() {
                let node = index.node(id).unwrap();
                let parent = index.node(node.parent().unwrap()).unwrap();
                prop_assert_eq!(parent.level() + 1, node.level());
            }
        }
    }

    #[test]
    fn sibling_chain_visits_level_once(input in insertions()) {
        let mut index = build(&input);
        for level in 1..=index.height() {
            index.set_right_links(level).unwrap();
            let first: Vec<_> = index.siblings(level).map(|n| n.id()).collect();
            index.set_right_links(level).unwrap();
            let second: Vec<_> = index.siblings(level).map(|n| n.id()).collect();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(index.gather_level(level).unwrap(), first.clone());
            let mut unique = first.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), first.len());
            if let Some(last) = first.last() {
                prop_assert_eq!(None, index.node(*last).unwrap().right_link());
            }
        }
    }
}
