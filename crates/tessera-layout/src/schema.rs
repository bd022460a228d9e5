//! JSON schema loader.
//!
//! Two layers, mirroring the declarative input the front end hands us:
//! - **Raw layer**: serde structs mapping 1:1 to the schema document
//! - **Registration**: raw declarations folded into a [`LayoutRegistry`]
//!   in declaration order
//!
//! Field type syntax: `"bool"`, `"uint<N>"`, `"int<N>"`, `"varuint<L>"`,
//! `"bits<N>"`, `"Name"` (inline), `"^Name"` (child-cell ref), `"cell"`
//! (opaque ref), `"rest"` (remainder). Nullability is a separate flag.

use serde::Deserialize;

use crate::error::LayoutError;
use crate::field::{FieldDef, FieldType};
use crate::layout::{FallbackPolicy, Opcode};
use crate::registry::{LayoutRegistry, TypeId};

/// Raw schema document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchema {
    pub types: Vec<RawType>,
}

/// Raw type declaration: a record (with fields) or a union (with
/// variants). Exactly one of `fields` / `variants` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct RawType {
    pub name: String,
    /// Opcode prefix, e.g. `{ "value": "0x2fcb26a2", "width": 32 }`.
    #[serde(default)]
    pub opcode: Option<RawOpcode>,
    #[serde(default)]
    pub fields: Option<Vec<RawField>>,
    #[serde(default)]
    pub variants: Option<Vec<String>>,
    /// Union only: allow a fallback arm for unknown discriminants.
    #[serde(default)]
    pub fallback: bool,
}

/// Raw opcode: value as a decimal or `0x` string, width in bits.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpcode {
    pub value: String,
    pub width: u8,
}

/// Raw field declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub nullable: bool,
}

/// Parse a schema document and register every type, in order.
///
/// Returns the ids in declaration order. Forward references are not
/// supported: a field may only mention types declared earlier, which also
/// rules out recursive shapes the cell bound could never hold.
pub fn load_schema(json: &str, registry: &mut LayoutRegistry) -> Result<Vec<TypeId>, LayoutError> {
    let schema: RawSchema = serde_json::from_str(json)?;
    let mut ids = Vec::with_capacity(schema.types.len());
    for raw in &schema.types {
        ids.push(register_raw(raw, registry)?);
    }
    Ok(ids)
}

fn register_raw(raw: &RawType, registry: &mut LayoutRegistry) -> Result<TypeId, LayoutError> {
    match (&raw.fields, &raw.variants) {
        (Some(fields), None) => {
            let opcode = raw.opcode.as_ref().map(parse_opcode).transpose()?;
            let fields = fields
                .iter()
                .map(|f| parse_field(f, registry))
                .collect::<Result<Vec<_>, _>>()?;
            registry.register_record(&raw.name, opcode, fields)
        }
        (None, Some(variants)) => {
            let ids = variants
                .iter()
                .map(|v| registry.resolve(v))
                .collect::<Result<Vec<_>, _>>()?;
            let policy = if raw.fallback {
                FallbackPolicy::Fallback
            } else {
                FallbackPolicy::Reject
            };
            registry.register_union(&raw.name, &ids, policy)
        }
        _ => Err(LayoutError::Schema(format!(
            "type `{}` must declare exactly one of `fields` or `variants`",
            raw.name
        ))),
    }
}

fn parse_opcode(raw: &RawOpcode) -> Result<Opcode, LayoutError> {
    let value = if let Some(hex) = raw.value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        raw.value.parse()
    }
    .map_err(|_| LayoutError::Schema(format!("bad opcode value `{}`", raw.value)))?;
    Ok(Opcode::new(value, raw.width))
}

fn parse_field(raw: &RawField, registry: &LayoutRegistry) -> Result<FieldDef, LayoutError> {
    let ty = parse_field_type(&raw.type_name, registry)?;
    let def = FieldDef::new(&raw.name, ty);
    Ok(if raw.nullable { def.nullable() } else { def })
}

fn parse_field_type(spec: &str, registry: &LayoutRegistry) -> Result<FieldType, LayoutError> {
    let bad = || LayoutError::Schema(format!("bad field type `{spec}`"));

    Ok(match spec {
        "bool" => FieldType::Bool,
        "cell" => FieldType::RawRef,
        "rest" => FieldType::Remainder,
        _ => {
            if let Some(rest) = spec.strip_prefix('^') {
                FieldType::Ref(registry.resolve(rest)?)
            } else if let Some(n) = parse_angle(spec, "uint") {
                FieldType::Uint {
                    bits: n.ok_or_else(bad)?,
                }
            } else if let Some(n) = parse_angle(spec, "int") {
                FieldType::Int {
                    bits: n.ok_or_else(bad)?,
                }
            } else if let Some(n) = parse_angle(spec, "varuint") {
                FieldType::VarUint {
                    len_bits: n.ok_or_else(bad)?.try_into().map_err(|_| bad())?,
                }
            } else if let Some(n) = parse_angle(spec, "bits") {
                FieldType::Bits {
                    len: n.ok_or_else(bad)?,
                }
            } else {
                FieldType::Inline(registry.resolve(spec)?)
            }
        }
    })
}

/// Parse `prefix<N>`; returns `None` if `spec` does not start with the
/// prefix, `Some(None)` if it does but `N` is malformed.
fn parse_angle(spec: &str, prefix: &str) -> Option<Option<u16>> {
    let rest = spec.strip_prefix(prefix)?;
    let inner = rest.strip_prefix('<')?.strip_suffix('>')?;
    Some(inner.parse().ok())
}
