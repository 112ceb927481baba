#![no_main]
use libfuzzer_sys::fuzz_target;

use leveled_range_index::{IndexConfig, RangeIndex};

fuzz_target!(|data: Vec<(i32, u8)>| {
    let mut fixture = RangeIndex::with_config(IndexConfig::default().check_invariants(true));

    for (key, level) in data {
        // Level 0 is rejected, every other level must be accepted
        let level = level as usize % 8;
        let result = fixture.insert_at(key, level);
        assert_eq!(level == 0, result.is_err());
    }

    // Check the sibling chain of each level against a fresh traversal
    for level in 1..=fixture.height() {
        fixture.set_right_links(level).unwrap();
        let gathered = fixture.gather_level(level).unwrap();
        let chained: Vec<_> = fixture.siblings(level).map(|n| n.id()).collect();
        assert_eq!(gathered, chained);
    }

    for v in [i32::MIN, -1, 0, 1, i32::MAX] {
        if let Some(root) = fixture.root() {
            assert!(root.in_range(&v));
        }
    }
});
