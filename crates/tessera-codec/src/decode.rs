//! Cell → typed value decoding (eager path) and the field read/skip
//! primitives the lazy path shares.

use std::sync::Arc;

use tessera_cell::{Cell, CellSlice};
use tessera_layout::{FieldDef, FieldType, LayoutRegistry, RecordLayout, TypeId, TypeLayout};

use crate::error::{CodecError, read_context};
use crate::value::Value;

/// Decode `cell` as type `ty`, materializing every field immediately.
///
/// Trailing unread bits/refs are legal; use [`decode_strict`] to reject
/// them.
pub fn decode(registry: &LayoutRegistry, cell: &Cell, ty: TypeId) -> Result<Value, CodecError> {
    let mut slice = CellSlice::new(cell);
    decode_at(registry, &mut slice, ty)
}

/// Decode `cell` as type `ty` and require full consumption.
pub fn decode_strict(
    registry: &LayoutRegistry,
    cell: &Cell,
    ty: TypeId,
) -> Result<Value, CodecError> {
    let mut slice = CellSlice::new(cell);
    let value = decode_at(registry, &mut slice, ty)?;
    if !slice.is_exhausted() {
        return Err(CodecError::TrailingData {
            type_name: registry.layout_of(ty)?.name().to_owned(),
            bits: slice.remaining_bits(),
            refs: slice.remaining_refs(),
        });
    }
    Ok(value)
}

/// Decode a value of type `ty` at the slice's current position. Inline
/// fields and ref children re-enter here.
pub(crate) fn decode_at(
    registry: &LayoutRegistry,
    slice: &mut CellSlice<'_>,
    ty: TypeId,
) -> Result<Value, CodecError> {
    match registry.layout_of(ty)? {
        TypeLayout::Record(record) => {
            check_opcode(record, slice)?;
            decode_record_body(registry, slice, record)
        }
        TypeLayout::Union(union) => {
            let resolved = union
                .trie
                .resolve(slice)
                .map_err(|e| read_context(&union.name, "<discriminant>", e))?;
            let Some((variant_index, _width)) = resolved else {
                return Err(CodecError::UnmatchedVariant {
                    union: union.name.clone(),
                });
            };
            let variant = &union.variants[variant_index as usize];
            let record = registry.record_of(variant.type_id)?;
            // The trie consumed the discriminant, which is the variant's
            // opcode; decode the body only.
            let fields = decode_record_body(registry, slice, record)?;
            Ok(Value::Variant {
                index: variant_index as usize,
                fields: match fields {
                    Value::Record(fields) => fields,
                    _ => unreachable!("record body decodes to a record"),
                },
            })
        }
    }
}

/// Validate a record's declared opcode prefix, consuming it.
pub(crate) fn check_opcode(
    record: &RecordLayout,
    slice: &mut CellSlice<'_>,
) -> Result<(), CodecError> {
    let Some(op) = record.opcode else {
        return Ok(());
    };
    if op.width == 0 {
        return Ok(());
    }
    let found = slice
        .load_uint(op.width as u16)
        .map_err(|e| read_context(&record.name, "<opcode>", e))? as u64;
    if found != op.value {
        return Err(CodecError::OpcodeMismatch {
            type_name: record.name.clone(),
            expected: op.value,
            found,
        });
    }
    Ok(())
}

/// Decode a record's fields (opcode already consumed).
pub(crate) fn decode_record_body(
    registry: &LayoutRegistry,
    slice: &mut CellSlice<'_>,
    record: &RecordLayout,
) -> Result<Value, CodecError> {
    let mut fields = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        fields.push(read_field(registry, &record.name, field, slice)?);
    }
    Ok(Value::Record(fields))
}

/// Decode one field at the slice position, presence bit included.
pub(crate) fn read_field(
    registry: &LayoutRegistry,
    type_name: &str,
    field: &FieldDef,
    slice: &mut CellSlice<'_>,
) -> Result<Value, CodecError> {
    let wrap = |e| read_context(type_name, &field.name, e);

    if field.nullable {
        let present = slice.load_bit().map_err(wrap)?;
        if !present {
            // Absent payload consumes nothing, bits or refs.
            return Ok(Value::Null);
        }
    }

    match &field.ty {
        FieldType::Bool => Ok(Value::Bool(slice.load_bit().map_err(wrap)?)),
        FieldType::Uint { bits } => Ok(Value::Uint(slice.load_uint(*bits).map_err(wrap)?)),
        FieldType::Int { bits } => Ok(Value::Int(slice.load_int(*bits).map_err(wrap)?)),
        FieldType::VarUint { len_bits } => {
            let byte_len = slice.load_uint(*len_bits as u16).map_err(wrap)? as u32;
            if byte_len > 16 {
                return Err(CodecError::ValueOutOfRange {
                    type_name: type_name.to_owned(),
                    field: field.name.clone(),
                    reason: format!("{byte_len}-byte integer exceeds 128 bits"),
                });
            }
            Ok(Value::VarUint(
                slice.load_uint((byte_len * 8) as u16).map_err(wrap)?,
            ))
        }
        FieldType::Bits { len } => Ok(Value::Bits(slice.load_bits(*len as usize).map_err(wrap)?)),
        FieldType::Inline(ty) => decode_at(registry, slice, *ty),
        FieldType::Ref(ty) => {
            let child = slice.load_ref().map_err(wrap)?;
            let mut child_slice = CellSlice::new(child);
            decode_at(registry, &mut child_slice, *ty)
        }
        FieldType::RawRef => Ok(Value::Ref(Arc::clone(slice.load_ref().map_err(wrap)?))),
        FieldType::Remainder => {
            let (bits, refs) = slice.load_remainder();
            Ok(Value::Remainder { bits, refs })
        }
    }
}

/// Advance the slice past one field without materializing its value.
///
/// Only the minimum is parsed: the presence bit for nullables, the length
/// prefix for varuints, the discriminant for inline unions. Inline
/// records recurse field-by-field.
pub(crate) fn skip_field(
    registry: &LayoutRegistry,
    type_name: &str,
    field: &FieldDef,
    slice: &mut CellSlice<'_>,
) -> Result<(), CodecError> {
    let wrap = |e| read_context(type_name, &field.name, e);

    if field.nullable {
        let present = slice.load_bit().map_err(wrap)?;
        if !present {
            return Ok(());
        }
    }

    match &field.ty {
        FieldType::Bool => slice.skip_bits(1).map_err(wrap),
        FieldType::Uint { bits } | FieldType::Int { bits } => {
            slice.skip_bits(*bits as usize).map_err(wrap)
        }
        FieldType::VarUint { len_bits } => {
            let byte_len = slice.load_uint(*len_bits as u16).map_err(wrap)? as usize;
            slice.skip_bits(byte_len * 8).map_err(wrap)
        }
        FieldType::Bits { len } => slice.skip_bits(*len as usize).map_err(wrap),
        FieldType::Inline(ty) => skip_type(registry, slice, *ty),
        FieldType::Ref(_) | FieldType::RawRef => slice.skip_refs(1).map_err(wrap),
        FieldType::Remainder => {
            let _ = slice.load_remainder();
            Ok(())
        }
    }
}

/// Advance past a whole inline value of type `ty`.
fn skip_type(
    registry: &LayoutRegistry,
    slice: &mut CellSlice<'_>,
    ty: TypeId,
) -> Result<(), CodecError> {
    match registry.layout_of(ty)? {
        TypeLayout::Record(record) => {
            check_opcode(record, slice)?;
            for field in &record.fields {
                skip_field(registry, &record.name, field, slice)?;
            }
            Ok(())
        }
        TypeLayout::Union(union) => {
            let resolved = union
                .trie
                .resolve(slice)
                .map_err(|e| read_context(&union.name, "<discriminant>", e))?;
            let Some((variant_index, _)) = resolved else {
                return Err(CodecError::UnmatchedVariant {
                    union: union.name.clone(),
                });
            };
            let record = registry.record_of(union.variants[variant_index as usize].type_id)?;
            for field in &record.fields {
                skip_field(registry, &record.name, field, slice)?;
            }
            Ok(())
        }
    }
}
