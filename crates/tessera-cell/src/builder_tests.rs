//! Tests for CellBuilder limit enforcement.

use super::{Cell, CellBuilder, CellError, CellLimits};

#[test]
fn store_chain_produces_expected_bits() {
    let cell = CellBuilder::new()
        .store_uint(7, 32)
        .unwrap()
        .store_bit(true)
        .unwrap()
        .finish();
    assert_eq!(cell.bit_len(), 33);
    assert_eq!(cell.ref_count(), 0);
    assert_eq!(
        cell.bits().to_string(),
        "000000000000000000000000000001111"
    );
}

#[test]
fn exact_capacity_fits() {
    let limits = CellLimits {
        max_bits: 16,
        max_refs: 1,
    };
    let cell = CellBuilder::with_limits(limits)
        .store_uint(0xFFFF, 16)
        .unwrap()
        .finish();
    assert_eq!(cell.bit_len(), 16);
}

#[test]
fn one_bit_over_capacity_fails() {
    let limits = CellLimits {
        max_bits: 16,
        max_refs: 1,
    };
    let err = CellBuilder::with_limits(limits)
        .store_uint(0xFFFF, 16)
        .unwrap()
        .store_bit(false)
        .unwrap_err();
    assert_eq!(
        err,
        CellError::BitOverflow {
            capacity: 16,
            requested: 17
        }
    );
}

#[test]
fn ref_overflow_fails() {
    let limits = CellLimits {
        max_bits: 8,
        max_refs: 2,
    };
    let child = CellBuilder::new().finish_shared();
    let builder = CellBuilder::with_limits(limits)
        .store_ref(child.clone())
        .unwrap()
        .store_ref(child.clone())
        .unwrap();
    let err = builder.store_ref(child).unwrap_err();
    assert_eq!(err, CellError::RefOverflow { capacity: 2 });
}

#[test]
fn canonical_profile_limits() {
    let builder = CellBuilder::new();
    assert_eq!(builder.limits().max_bits, 1023);
    assert_eq!(builder.limits().max_refs, 4);
}

#[test]
fn empty_cell() {
    let cell = Cell::empty();
    assert_eq!(cell.bit_len(), 0);
    assert_eq!(cell.ref_count(), 0);
}
