//! Tests for the JSON schema loader.

use indoc::indoc;

use super::schema::load_schema;
use super::{FieldType, LayoutError, LayoutRegistry};

#[test]
fn load_records_and_union() {
    let json = indoc! {r#"
        {
          "types": [
            {
              "name": "Transfer",
              "opcode": { "value": "0x01", "width": 8 },
              "fields": [
                { "name": "amount", "type": "varuint<4>" },
                { "name": "memo", "type": "uint<32>", "nullable": true },
                { "name": "payload", "type": "rest" }
              ]
            },
            {
              "name": "Burn",
              "opcode": { "value": "0x02", "width": 8 },
              "fields": [
                { "name": "amount", "type": "varuint<4>" }
              ]
            },
            {
              "name": "Message",
              "variants": ["Transfer", "Burn"],
              "fallback": true
            }
          ]
        }
    "#};

    let mut reg = LayoutRegistry::new();
    let ids = load_schema(json, &mut reg).unwrap();
    assert_eq!(ids.len(), 3);

    let transfer = reg.record_of(ids[0]).unwrap();
    assert_eq!(transfer.opcode.unwrap().value, 0x01);
    assert_eq!(transfer.fields[0].ty, FieldType::VarUint { len_bits: 4 });
    assert!(transfer.fields[1].nullable);
    assert_eq!(transfer.remainder, Some(2));

    let union = reg.union_of(ids[2]).unwrap();
    assert_eq!(union.variants.len(), 2);
    assert_eq!(union.fallback, super::FallbackPolicy::Fallback);
}

#[test]
fn ref_and_inline_field_syntax() {
    let json = indoc! {r#"
        {
          "types": [
            { "name": "Inner", "fields": [ { "name": "v", "type": "uint<8>" } ] },
            {
              "name": "Outer",
              "fields": [
                { "name": "inline", "type": "Inner" },
                { "name": "boxed", "type": "^Inner" },
                { "name": "extra", "type": "cell" }
              ]
            }
          ]
        }
    "#};

    let mut reg = LayoutRegistry::new();
    let ids = load_schema(json, &mut reg).unwrap();
    let outer = reg.record_of(ids[1]).unwrap();
    assert_eq!(outer.fields[0].ty, FieldType::Inline(ids[0]));
    assert_eq!(outer.fields[1].ty, FieldType::Ref(ids[0]));
    assert_eq!(outer.fields[2].ty, FieldType::RawRef);
}

#[test]
fn forward_reference_fails() {
    let json = indoc! {r#"
        {
          "types": [
            { "name": "Outer", "fields": [ { "name": "inner", "type": "Inner" } ] },
            { "name": "Inner", "fields": [] }
          ]
        }
    "#};
    let mut reg = LayoutRegistry::new();
    let err = load_schema(json, &mut reg).unwrap_err();
    assert!(matches!(err, LayoutError::UnknownType(name) if name == "Inner"));
}

#[test]
fn fields_and_variants_are_mutually_exclusive() {
    let json = r#"{ "types": [ { "name": "Both", "fields": [], "variants": [] } ] }"#;
    let mut reg = LayoutRegistry::new();
    assert!(matches!(
        load_schema(json, &mut reg).unwrap_err(),
        LayoutError::Schema(_)
    ));
}

#[test]
fn malformed_json_surfaces_serde_error() {
    let mut reg = LayoutRegistry::new();
    assert!(matches!(
        load_schema("{", &mut reg).unwrap_err(),
        LayoutError::SchemaJson(_)
    ));
}

#[test]
fn bad_field_type_rejected() {
    let json = r#"{ "types": [ { "name": "A", "fields": [ { "name": "x", "type": "uint<nope>" } ] } ] }"#;
    let mut reg = LayoutRegistry::new();
    assert!(matches!(
        load_schema(json, &mut reg).unwrap_err(),
        LayoutError::Schema(_)
    ));
}
