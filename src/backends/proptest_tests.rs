//! Property-based tests for engine behavior.
//!
//! Each property drives the in-memory engine alongside a plain `BTreeMap`
//! model and asserts the observable behavior matches. Keys draw from a
//! tiny alphabet so that overwrites, deletes of present keys, and range
//! boundary collisions actually happen.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::backends::MemoryStorage;
use crate::engine::{prefix_upper_bound, Batch, Cursor, Storage, Write};

fn arb_key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..6)
}

fn arb_value() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..8)
}

fn arb_entries() -> impl Strategy<Value = Vec<(Vec<u8>, Vec<u8>)>> {
    prop::collection::vec((arb_key(), arb_value()), 0..48)
}

fn populated(entries: &[(Vec<u8>, Vec<u8>)]) -> (MemoryStorage, BTreeMap<Vec<u8>, Vec<u8>>) {
    let store = MemoryStorage::new();
    let mut model = BTreeMap::new();
    for (key, value) in entries {
        store.put(key, value).expect("failed to put");
        model.insert(key.clone(), value.clone());
    }
    (store, model)
}

fn collect_forward<C: Cursor>(cursor: &mut C) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    while cursor.next().expect("failed to step cursor") {
        let key = cursor.key().expect("positioned cursor has a key").to_vec();
        let value = cursor.value().expect("positioned cursor has a value").to_vec();
        out.push((key, value));
    }
    out
}

proptest! {
    #[test]
    fn iteration_is_sorted_and_complete(entries in arb_entries()) {
        let (store, model) = populated(&entries);

        let mut cursor = store.iter(None, None).expect("failed to iter");
        let walked = collect_forward(&mut cursor);

        let expected: Vec<_> = model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn backward_iteration_reverses_forward(entries in arb_entries()) {
        let (store, model) = populated(&entries);

        let mut cursor = store.iter(None, None).expect("failed to iter");
        let mut walked = Vec::new();
        while cursor.prev().expect("failed to step cursor") {
            walked.push(cursor.key().expect("positioned").to_vec());
        }

        let expected: Vec<_> = model.keys().rev().cloned().collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn range_window_matches_model(
        entries in arb_entries(),
        start in arb_key(),
        end in arb_key(),
    ) {
        let (store, model) = populated(&entries);

        let mut cursor = store.iter(Some(start.as_slice()), Some(end.as_slice())).expect("failed to iter");
        let walked: Vec<_> = collect_forward(&mut cursor).into_iter().map(|(k, _)| k).collect();

        // Empty bounds mean unbounded on that side.
        let expected: Vec<_> = model
            .keys()
            .filter(|k| start.is_empty() || k.as_slice() >= start.as_slice())
            .filter(|k| end.is_empty() || k.as_slice() < end.as_slice())
            .cloned()
            .collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn prefix_scan_matches_model(
        entries in arb_entries(),
        prefix in prop::collection::vec(0u8..4, 0..3),
    ) {
        let (store, model) = populated(&entries);

        let mut cursor = store.prefix(&prefix).expect("failed to prefix");
        let walked: Vec<_> = collect_forward(&mut cursor).into_iter().map(|(k, _)| k).collect();

        let expected: Vec<_> =
            model.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn has_agrees_with_get(
        entries in arb_entries(),
        probes in prop::collection::vec(arb_key(), 0..16),
    ) {
        let (store, model) = populated(&entries);

        for probe in &probes {
            let has = store.has(probe).expect("failed to has");
            prop_assert_eq!(has, model.contains_key(probe));
            match store.get(probe) {
                Ok(value) => {
                    prop_assert!(has);
                    prop_assert_eq!(Some(&value), model.get(probe));
                }
                Err(err) => {
                    prop_assert!(err.is_not_found());
                    prop_assert!(!has);
                }
            }
        }
    }

    #[test]
    fn batch_commit_matches_model(
        entries in arb_entries(),
        staged in prop::collection::vec((any::<bool>(), arb_key(), arb_value()), 0..32),
    ) {
        let (store, mut model) = populated(&entries);

        let mut batch = store.batch().expect("failed to batch");
        for (is_delete, key, value) in &staged {
            if *is_delete {
                batch.delete(key);
                model.remove(key);
            } else {
                batch.put(key, value);
                model.insert(key.clone(), value.clone());
            }
        }
        batch.commit().expect("failed to commit");

        let mut cursor = store.iter(None, None).expect("failed to iter");
        let walked = collect_forward(&mut cursor);
        let expected: Vec<_> = model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        prop_assert_eq!(walked, expected);
    }

    #[test]
    fn prefix_upper_bound_is_tight(
        prefix in prop::collection::vec(any::<u8>(), 1..6),
        suffix in prop::collection::vec(any::<u8>(), 0..4),
    ) {
        let mut extended = prefix.clone();
        extended.extend_from_slice(&suffix);

        match prefix_upper_bound(&prefix) {
            Some(upper) => {
                // Every extension of the prefix sorts below the bound, and
                // the bound itself does not share the prefix.
                prop_assert!(extended.as_slice() < upper.as_slice());
                prop_assert!(!upper.starts_with(&prefix));
            }
            None => {
                // Only an all-0xFF prefix has no finite bound.
                prop_assert!(prefix.iter().all(|&b| b == u8::MAX));
            }
        }
    }
}
