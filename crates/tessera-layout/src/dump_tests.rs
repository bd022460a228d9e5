//! Snapshot tests for the registry dump.

use super::dump::dump;
use super::{FallbackPolicy, FieldDef, FieldType, LayoutRegistry, Opcode};

#[test]
fn dump_records_and_union() {
    let mut reg = LayoutRegistry::new();
    let ping = reg
        .register_record(
            "Ping",
            Some(Opcode::new(0x1, 8)),
            vec![
                FieldDef::new("seq", FieldType::Uint { bits: 32 }),
                FieldDef::new("urgent", FieldType::Bool).nullable(),
            ],
        )
        .unwrap();
    let pong = reg
        .register_record(
            "Pong",
            Some(Opcode::new(0x2, 8)),
            vec![FieldDef::new("seq", FieldType::Uint { bits: 32 })],
        )
        .unwrap();
    reg.register_union("Frame", &[ping, pong], FallbackPolicy::Reject)
        .unwrap();

    insta::assert_snapshot!(dump(&reg), @r"
registry: 3 types, limits 1023 bits / 4 refs

T0 record Ping
  opcode: 0x1/8
  field 0: seq uint32
  field 1: urgent bool?
  shape: bits 41..42, refs 0..0

T1 record Pong
  opcode: 0x2/8
  field 0: seq uint32
  shape: bits 40..40, refs 0..0

T2 union Frame
  fallback: Reject
  variant 0: Ping = 0x1/8
  variant 1: Pong = 0x2/8
  shape: bits 40..42, refs 0..0
");
}

#[test]
fn dump_remainder_shape_is_unbounded() {
    let mut reg = LayoutRegistry::new();
    reg.register_record(
        "Envelope",
        None,
        vec![
            FieldDef::new("kind", FieldType::Uint { bits: 8 }),
            FieldDef::new("body", FieldType::Remainder),
        ],
    )
    .unwrap();

    let text = dump(&reg);
    assert!(text.contains("field 1: body rest"));
    assert!(text.contains("shape: bits 8..*, refs 0..0"));
}
