//! Tests for dictionary operations.

use std::sync::Arc;

use tessera_cell::{Cell, CellBuilder};

use super::dict::{Dictionary, MapEntry};
use super::error::DictError;
use super::key::KeyOrder;

fn val(n: u32) -> Cell {
    CellBuilder::new()
        .store_uint(n as u128, 32)
        .unwrap()
        .finish()
}

fn dict_of(keys: &[i128]) -> Dictionary {
    let mut dict = Dictionary::new(16, KeyOrder::Unsigned);
    for &k in keys {
        dict = dict.set(k, &val(k as u32)).unwrap();
    }
    dict
}

#[test]
fn empty_dictionary_is_total() {
    let dict = Dictionary::new(16, KeyOrder::Unsigned);
    assert!(dict.is_empty());
    assert!(dict.root().is_none());
    assert!(!dict.get(5).unwrap().found());
    assert!(!dict.first().unwrap().found());
    assert!(!dict.last().unwrap().found());
    assert!(!dict.next(5).unwrap().found());
    assert!(!dict.prev_or_equal(5).unwrap().found());
    assert_eq!(dict.iter().count(), 0);

    let (same, removed) = dict.remove(5).unwrap();
    assert!(!removed);
    assert!(same.is_empty());
}

#[test]
fn set_then_get_round_trips_the_value() {
    let dict = Dictionary::new(16, KeyOrder::Unsigned);
    let dict = dict.set(42, &val(7)).unwrap();

    let entry = dict.get(42).unwrap();
    assert!(entry.found());
    assert_eq!(entry.key, 42);
    assert_eq!(entry.value.unwrap(), val(7));
    assert!(!dict.get(43).unwrap().found());
}

#[test]
fn values_keep_their_refs() {
    let child = Arc::new(val(1));
    let value = CellBuilder::new()
        .store_uint(0xAB, 8)
        .unwrap()
        .store_ref(Arc::clone(&child))
        .unwrap()
        .finish();

    let dict = Dictionary::new(8, KeyOrder::Unsigned)
        .set(3, &value)
        .unwrap();
    let got = dict.get(3).unwrap().value.unwrap();
    assert_eq!(got, value);
    assert_eq!(got.reference(0).unwrap(), &child);
}

#[test]
fn mutators_leave_the_receiver_untouched() {
    let d1 = dict_of(&[1, 3]);
    let d2 = d1.set(5, &val(5)).unwrap();
    let (d3, removed) = d2.remove(1).unwrap();

    assert!(removed);
    assert!(!d1.get(5).unwrap().found());
    assert!(d2.get(5).unwrap().found());
    assert!(d2.get(1).unwrap().found());
    assert!(!d3.get(1).unwrap().found());

    // Untouched subtrees are shared, not copied.
    assert!(d1.get(3).unwrap().found());
    assert!(d3.get(3).unwrap().found());
}

#[test]
fn overwrite_replaces_the_value() {
    let dict = dict_of(&[9]);
    let dict = dict.set(9, &val(100)).unwrap();
    assert_eq!(dict.get(9).unwrap().value.unwrap(), val(100));
    assert_eq!(dict.iter().count(), 1);
}

#[test]
fn conditional_set_variants() {
    let dict = dict_of(&[1]);

    let (d, inserted) = dict.set_if_absent(1, &val(99)).unwrap();
    assert!(!inserted);
    assert_eq!(d.get(1).unwrap().value.unwrap(), val(1));

    let (d, inserted) = dict.set_if_absent(2, &val(2)).unwrap();
    assert!(inserted);
    assert!(d.get(2).unwrap().found());

    let (d, replaced) = dict.set_if_present(1, &val(99)).unwrap();
    assert!(replaced);
    assert_eq!(d.get(1).unwrap().value.unwrap(), val(99));

    let (d, replaced) = dict.set_if_present(2, &val(2)).unwrap();
    assert!(!replaced);
    assert!(!d.get(2).unwrap().found());
}

#[test]
fn remove_merges_the_surviving_sibling() {
    let dict = dict_of(&[0x00F0, 0x00F1, 0x0F00]);
    let (dict, removed) = dict.remove(0x00F1).unwrap();
    assert!(removed);

    assert_eq!(dict.get(0x00F0).unwrap().value.unwrap(), val(0x00F0));
    assert_eq!(dict.get(0x0F00).unwrap().value.unwrap(), val(0x0F00));
    assert!(!dict.get(0x00F1).unwrap().found());

    let (dict, removed) = dict.remove(0x00F0).unwrap();
    assert!(removed);
    let (dict, removed) = dict.remove(0x0F00).unwrap();
    assert!(removed);
    assert!(dict.is_empty());
}

#[test]
fn ordered_navigation() {
    let dict = dict_of(&[1, 3, 5]);

    assert_eq!(dict.first().unwrap().key, 1);
    assert_eq!(dict.last().unwrap().key, 5);

    assert_eq!(dict.next(3).unwrap().key, 5);
    assert_eq!(dict.next_or_equal(3).unwrap().key, 3);
    assert_eq!(dict.next(0).unwrap().key, 1);
    assert_eq!(dict.next(2).unwrap().key, 3);
    assert!(!dict.next(5).unwrap().found());

    assert_eq!(dict.prev(3).unwrap().key, 1);
    assert_eq!(dict.prev_or_equal(3).unwrap().key, 3);
    assert_eq!(dict.prev(6).unwrap().key, 5);
    assert_eq!(dict.prev(2).unwrap().key, 1);
    assert!(!dict.prev(1).unwrap().found());

    // Navigation misses echo the pivot.
    let miss = dict.next(5).unwrap();
    assert_eq!(miss.key, 5);
    assert!(miss.value.is_none());
}

#[test]
fn signed_navigation_follows_numeric_order() {
    let mut dict = Dictionary::new(8, KeyOrder::Signed);
    for k in [-5i128, -1, 0, 7] {
        dict = dict.set(k, &val(k as u32 & 0xFF)).unwrap();
    }

    assert_eq!(dict.first().unwrap().key, -5);
    assert_eq!(dict.last().unwrap().key, 7);
    assert_eq!(dict.next(-1).unwrap().key, 0);
    assert_eq!(dict.prev(0).unwrap().key, -1);
    assert_eq!(dict.next_or_equal(-5).unwrap().key, -5);
    assert_eq!(dict.prev(-5).unwrap().found(), false);

    let keys: Vec<i128> = dict.iter().map(|e| e.unwrap().0).collect();
    assert_eq!(keys, vec![-5, -1, 0, 7]);
}

#[test]
fn iteration_is_in_key_order_with_values() {
    let keys = [40i128, 2, 1000, 7, 41];
    let dict = dict_of(&keys);

    let entries: Vec<(i128, Cell)> = dict.iter().map(|e| e.unwrap()).collect();
    let got: Vec<i128> = entries.iter().map(|(k, _)| *k).collect();
    assert_eq!(got, vec![2, 7, 40, 41, 1000]);
    for (k, v) in &entries {
        assert_eq!(*v, val(*k as u32));
    }
}

#[test]
fn dense_key_set_survives_churn() {
    let mut dict = Dictionary::new(16, KeyOrder::Unsigned);
    for k in 0..64i128 {
        dict = dict.set(k, &val(k as u32)).unwrap();
    }
    for k in (0..64i128).step_by(2) {
        let (next, removed) = dict.remove(k).unwrap();
        assert!(removed);
        dict = next;
    }

    let keys: Vec<i128> = dict.iter().map(|e| e.unwrap().0).collect();
    assert_eq!(keys, (0..64i128).filter(|k| k % 2 == 1).collect::<Vec<_>>());
    assert_eq!(dict.next_or_equal(32).unwrap().key, 33);
    assert_eq!(dict.prev(33).unwrap().key, 31);
}

#[test]
fn navigation_agrees_with_a_model_for_every_pivot() {
    fn hit(entry: MapEntry) -> Option<i128> {
        entry.found().then_some(entry.key)
    }

    let keys = [3i128, 64, 65, 500, 511, 1000];
    let mut dict = Dictionary::new(10, KeyOrder::Unsigned);
    for &k in &keys {
        dict = dict.set(k, &val(k as u32)).unwrap();
    }

    for pivot in 0..1024i128 {
        let next = keys.iter().copied().filter(|&k| k > pivot).min();
        let next_eq = keys.iter().copied().filter(|&k| k >= pivot).min();
        let prev = keys.iter().copied().filter(|&k| k < pivot).max();
        let prev_eq = keys.iter().copied().filter(|&k| k <= pivot).max();

        assert_eq!(hit(dict.next(pivot).unwrap()), next, "next({pivot})");
        assert_eq!(
            hit(dict.next_or_equal(pivot).unwrap()),
            next_eq,
            "next_or_equal({pivot})"
        );
        assert_eq!(hit(dict.prev(pivot).unwrap()), prev, "prev({pivot})");
        assert_eq!(
            hit(dict.prev_or_equal(pivot).unwrap()),
            prev_eq,
            "prev_or_equal({pivot})"
        );
    }
}

#[test]
fn out_of_range_key_is_an_error() {
    let dict = dict_of(&[1]);
    assert!(matches!(
        dict.get(70000),
        Err(DictError::KeyOutOfRange { .. })
    ));
    assert!(matches!(
        dict.set(-1, &val(0)),
        Err(DictError::KeyOutOfRange { .. })
    ));
    assert!(matches!(
        dict.next(1 << 20),
        Err(DictError::KeyOutOfRange { .. })
    ));
}

#[test]
fn malformed_root_is_reported() {
    // Label length 9 with only 8 key bits.
    let bogus = Arc::new(
        CellBuilder::new()
            .store_uint(9, 4)
            .unwrap()
            .store_uint(0, 9)
            .unwrap()
            .finish(),
    );
    let dict = Dictionary::from_root(
        bogus,
        8,
        KeyOrder::Unsigned,
        tessera_cell::CellLimits::default(),
    );
    assert!(matches!(dict.get(0), Err(DictError::Malformed { .. })));
    let items: Vec<_> = dict.iter().collect();
    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
}
