//! Tests for layout registration and validation.

use tessera_cell::CellLimits;

use super::{
    FallbackPolicy, FieldDef, FieldType, LayoutError, LayoutRegistry, Opcode, TypeLayout,
};

fn uint(name: &str, bits: u16) -> FieldDef {
    FieldDef::new(name, FieldType::Uint { bits })
}

#[test]
fn record_shape_accounting() {
    let mut reg = LayoutRegistry::new();
    let id = reg
        .register_record(
            "Point",
            None,
            vec![uint("x", 32), uint("y", 32), FieldDef::new("flag", FieldType::Bool)],
        )
        .unwrap();

    let record = reg.record_of(id).unwrap();
    assert_eq!(record.shape.min_bits, 65);
    assert_eq!(record.shape.max_bits, Some(65));
    assert_eq!(record.shape.max_refs, 0);
    assert_eq!(record.field_index("y"), Some(1));
}

#[test]
fn opcode_bits_count_toward_shape() {
    let mut reg = LayoutRegistry::new();
    let id = reg
        .register_record("Op", Some(Opcode::new(0x0F, 8)), vec![uint("v", 8)])
        .unwrap();
    assert_eq!(reg.record_of(id).unwrap().shape.min_bits, 16);
}

#[test]
fn nullable_field_reserves_one_presence_bit() {
    let mut reg = LayoutRegistry::new();
    let id = reg
        .register_record("N", None, vec![uint("v", 16).nullable()])
        .unwrap();
    let shape = reg.record_of(id).unwrap().shape;
    assert_eq!(shape.min_bits, 1);
    assert_eq!(shape.max_bits, Some(17));
}

#[test]
fn varuint_records_two_part_rule() {
    let mut reg = LayoutRegistry::new();
    let id = reg
        .register_record(
            "Coins",
            None,
            vec![FieldDef::new("amount", FieldType::VarUint { len_bits: 4 })],
        )
        .unwrap();
    let shape = reg.record_of(id).unwrap().shape;
    assert_eq!(shape.min_bits, 4);
    // 4-bit length prefix plus up to 15 payload bytes.
    assert_eq!(shape.max_bits, Some(4 + 15 * 8));
}

#[test]
fn varuint_without_length_prefix_is_ambiguous() {
    let mut reg = LayoutRegistry::new();
    let err = reg
        .register_record(
            "Bad",
            None,
            vec![FieldDef::new("amount", FieldType::VarUint { len_bits: 0 })],
        )
        .unwrap_err();
    assert!(matches!(err, LayoutError::AmbiguousWidth { .. }));
}

#[test]
fn remainder_must_be_last() {
    let mut reg = LayoutRegistry::new();
    let err = reg
        .register_record(
            "Bad",
            None,
            vec![FieldDef::new("rest", FieldType::Remainder), uint("after", 8)],
        )
        .unwrap_err();
    assert!(matches!(err, LayoutError::AmbiguousWidth { .. }));

    let id = reg
        .register_record(
            "Ok",
            None,
            vec![uint("before", 8), FieldDef::new("rest", FieldType::Remainder)],
        )
        .unwrap();
    let record = reg.record_of(id).unwrap();
    assert_eq!(record.remainder, Some(1));
    assert_eq!(record.shape.max_bits, None);
}

#[test]
fn ref_fields_consume_ref_slots_not_bits() {
    let mut reg = LayoutRegistry::new();
    let inner = reg.register_record("Inner", None, vec![uint("v", 8)]).unwrap();
    let id = reg
        .register_record(
            "Outer",
            None,
            vec![
                FieldDef::new("typed", FieldType::Ref(inner)),
                FieldDef::new("opaque", FieldType::RawRef),
            ],
        )
        .unwrap();
    let shape = reg.record_of(id).unwrap().shape;
    assert_eq!(shape.min_bits, 0);
    assert_eq!(shape.min_refs, 2);
}

#[test]
fn static_shape_overflow_rejected_at_registration() {
    let limits = CellLimits {
        max_bits: 64,
        max_refs: 2,
    };
    let mut reg = LayoutRegistry::with_limits(limits);
    let err = reg
        .register_record("TooWide", None, vec![uint("a", 64), uint("b", 1)])
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::ShapeOverflow { kind: "bits", .. }
    ));

    let err = reg
        .register_record(
            "TooDeep",
            None,
            vec![
                FieldDef::new("a", FieldType::RawRef),
                FieldDef::new("b", FieldType::RawRef),
                FieldDef::new("c", FieldType::RawRef),
            ],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::ShapeOverflow { kind: "refs", .. }
    ));
}

#[test]
fn exact_capacity_shape_is_accepted() {
    let limits = CellLimits {
        max_bits: 64,
        max_refs: 2,
    };
    let mut reg = LayoutRegistry::with_limits(limits);
    assert!(reg.register_record("Exact", None, vec![uint("a", 64)]).is_ok());
}

#[test]
fn union_discriminants_are_variant_opcodes() {
    let mut reg = LayoutRegistry::new();
    let a = reg
        .register_record("A", Some(Opcode::new(0x01, 8)), vec![uint("x", 8)])
        .unwrap();
    let b = reg
        .register_record("B", Some(Opcode::new(0x02, 8)), vec![uint("y", 16)])
        .unwrap();
    let id = reg
        .register_union("Msg", &[a, b], FallbackPolicy::Reject)
        .unwrap();

    let union = reg.union_of(id).unwrap();
    assert_eq!(union.variants.len(), 2);
    assert_eq!(union.variants[1].discriminant, 0x02);
    assert_eq!(union.variant_index("B"), Some(1));
    // Shape spans both variants, opcode included.
    assert_eq!(union.shape.min_bits, 16);
    assert_eq!(union.shape.max_bits, Some(24));
}

#[test]
fn duplicate_discriminant_rejected() {
    let mut reg = LayoutRegistry::new();
    let a = reg
        .register_record("A", Some(Opcode::new(0xAB, 8)), vec![])
        .unwrap();
    let b = reg
        .register_record("B", Some(Opcode::new(0xAB, 8)), vec![])
        .unwrap();
    let err = reg
        .register_union("Msg", &[a, b], FallbackPolicy::Reject)
        .unwrap_err();
    match err {
        LayoutError::AmbiguousDiscriminant { union, first, second } => {
            assert_eq!(union, "Msg");
            assert_eq!(first, "A");
            assert_eq!(second, "B");
        }
        other => panic!("expected AmbiguousDiscriminant, got {other:?}"),
    }
}

#[test]
fn prefix_discriminant_pair_rejected() {
    let mut reg = LayoutRegistry::new();
    let short = reg
        .register_record("Short", Some(Opcode::new(0x1, 4)), vec![])
        .unwrap();
    let long = reg
        .register_record("Long", Some(Opcode::new(0x10, 8)), vec![])
        .unwrap();
    let err = reg
        .register_union("Msg", &[short, long], FallbackPolicy::Reject)
        .unwrap_err();
    assert!(matches!(err, LayoutError::AmbiguousDiscriminant { .. }));
}

#[test]
fn union_variant_without_opcode_rejected() {
    let mut reg = LayoutRegistry::new();
    let a = reg.register_record("A", None, vec![uint("x", 8)]).unwrap();
    let err = reg
        .register_union("Msg", &[a], FallbackPolicy::Reject)
        .unwrap_err();
    assert!(matches!(err, LayoutError::MissingDiscriminant { .. }));
}

#[test]
fn lookups() {
    let mut reg = LayoutRegistry::new();
    let id = reg.register_record("A", None, vec![]).unwrap();

    assert_eq!(reg.resolve("A").unwrap(), id);
    assert!(matches!(
        reg.resolve("B").unwrap_err(),
        LayoutError::UnknownType(_)
    ));
    assert!(matches!(
        reg.layout_of(super::TypeId(99)).unwrap_err(),
        LayoutError::UnknownTypeId(_)
    ));
    assert!(matches!(
        reg.union_of(id).unwrap_err(),
        LayoutError::KindMismatch { .. }
    ));
    assert!(matches!(
        reg.register_record("A", None, vec![]).unwrap_err(),
        LayoutError::DuplicateType(_)
    ));
    assert!(matches!(reg.layout_of(id).unwrap(), TypeLayout::Record(_)));
}

#[test]
fn invalid_opcode_rejected() {
    let mut reg = LayoutRegistry::new();
    let err = reg
        .register_record("Bad", Some(Opcode::new(0x100, 8)), vec![])
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidOpcode { .. }));
}

#[test]
fn zero_width_opcode_is_legal() {
    let mut reg = LayoutRegistry::new();
    let id = reg
        .register_record("Empty", Some(Opcode::new(0, 0)), vec![])
        .unwrap();
    assert_eq!(reg.record_of(id).unwrap().shape.min_bits, 0);
}
