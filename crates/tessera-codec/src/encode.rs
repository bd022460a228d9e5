//! Typed value → cell encoding.

use std::sync::Arc;

use tessera_cell::{BitString, Cell, CellBuilder, CellLimits};
use tessera_layout::{FieldDef, FieldType, LayoutRegistry, RecordLayout, TypeId, TypeLayout};

use crate::error::{CodecError, write_context};
use crate::value::Value;

/// Encodes typed values into cell trees.
///
/// Encoding is deterministic: the same `(type, value)` pair always
/// produces bit-identical cells. Overflow fails hard except through a
/// remainder field, which chains into continuation cells automatically.
pub struct Encoder<'r> {
    registry: &'r LayoutRegistry,
    limits: CellLimits,
}

impl<'r> Encoder<'r> {
    /// Encoder using the registry's cell limits.
    pub fn new(registry: &'r LayoutRegistry) -> Self {
        Self {
            registry,
            limits: registry.limits(),
        }
    }

    /// Encode `value` as type `ty` into a fresh cell.
    pub fn encode(&self, ty: TypeId, value: &Value) -> Result<Cell, CodecError> {
        let builder = CellBuilder::with_limits(self.limits);
        Ok(self.encode_into(builder, ty, value)?.finish())
    }

    /// Encode into an Arc'd cell (ref fields, dictionary values).
    pub fn encode_shared(&self, ty: TypeId, value: &Value) -> Result<Arc<Cell>, CodecError> {
        Ok(Arc::new(self.encode(ty, value)?))
    }

    /// Encode `value` as type `ty` at the builder's current position.
    /// This is the inline-field path: bits and refs land in the caller's
    /// cell.
    pub fn encode_into(
        &self,
        builder: CellBuilder,
        ty: TypeId,
        value: &Value,
    ) -> Result<CellBuilder, CodecError> {
        match self.registry.layout_of(ty)? {
            TypeLayout::Record(record) => {
                let fields = match value {
                    Value::Record(fields) => fields,
                    other => return Err(self.mismatch(&record.name, "<record>", "record", other)),
                };
                self.encode_record(builder, record, fields)
            }
            TypeLayout::Union(union) => {
                let (index, fields) = match value {
                    Value::Variant { index, fields } => (*index, fields),
                    other => return Err(self.mismatch(&union.name, "<variant>", "variant", other)),
                };
                let variant = union.variants.get(index).ok_or_else(|| {
                    CodecError::ValueOutOfRange {
                        type_name: union.name.clone(),
                        field: "<variant>".into(),
                        reason: format!(
                            "variant index {index} out of {}",
                            union.variants.len()
                        ),
                    }
                })?;
                let record = self.registry.record_of(variant.type_id)?;
                self.encode_record(builder, record, fields)
            }
        }
    }

    fn encode_record(
        &self,
        mut builder: CellBuilder,
        record: &RecordLayout,
        values: &[Value],
    ) -> Result<CellBuilder, CodecError> {
        if values.len() != record.fields.len() {
            return Err(CodecError::TypeMismatch {
                type_name: record.name.clone(),
                field: "<record>".into(),
                expected: format!("{} fields", record.fields.len()),
                found: "record",
            });
        }

        if let Some(op) = record.opcode {
            builder = builder
                .store_uint(op.value as u128, op.width as u16)
                .map_err(|e| write_context(&record.name, "<opcode>", e))?;
        }

        for (field, value) in record.fields.iter().zip(values) {
            builder = self.encode_field(builder, &record.name, field, value)?;
        }
        Ok(builder)
    }

    fn encode_field(
        &self,
        mut builder: CellBuilder,
        type_name: &str,
        field: &FieldDef,
        value: &Value,
    ) -> Result<CellBuilder, CodecError> {
        let wrap = |e| write_context(type_name, &field.name, e);

        if field.nullable {
            if value.is_null() {
                return builder.store_bit(false).map_err(wrap);
            }
            builder = builder.store_bit(true).map_err(wrap)?;
        } else if value.is_null() {
            return Err(self.mismatch(type_name, &field.name, &field.ty.describe(), value));
        }

        match (&field.ty, value) {
            (FieldType::Bool, Value::Bool(b)) => builder.store_bit(*b).map_err(wrap),
            (FieldType::Uint { bits }, Value::Uint(v)) => {
                self.check_uint_range(type_name, field, *v, *bits)?;
                builder.store_uint(*v, *bits).map_err(wrap)
            }
            (FieldType::Int { bits }, Value::Int(v)) => {
                self.check_int_range(type_name, field, *v, *bits)?;
                builder.store_int(*v, *bits).map_err(wrap)
            }
            (FieldType::VarUint { len_bits }, Value::VarUint(v)) => {
                let byte_len = byte_width(*v);
                let max_len = (1u32 << *len_bits) - 1;
                if byte_len > max_len {
                    return Err(CodecError::ValueOutOfRange {
                        type_name: type_name.to_owned(),
                        field: field.name.clone(),
                        reason: format!("needs {byte_len} bytes, length prefix caps at {max_len}"),
                    });
                }
                builder = builder
                    .store_uint(byte_len as u128, *len_bits as u16)
                    .map_err(wrap)?;
                builder.store_uint(*v, (byte_len * 8) as u16).map_err(wrap)
            }
            (FieldType::Bits { len }, Value::Bits(bits)) => {
                if bits.len() != *len as usize {
                    return Err(CodecError::ValueOutOfRange {
                        type_name: type_name.to_owned(),
                        field: field.name.clone(),
                        reason: format!("expected {len} bits, got {}", bits.len()),
                    });
                }
                builder.store_bits(bits).map_err(wrap)
            }
            (FieldType::Inline(ty), inner) => self.encode_into(builder, *ty, inner),
            (FieldType::Ref(ty), inner) => {
                let child = self.encode_shared(*ty, inner)?;
                builder.store_ref(child).map_err(wrap)
            }
            (FieldType::RawRef, Value::Ref(cell)) => {
                builder.store_ref(Arc::clone(cell)).map_err(wrap)
            }
            (FieldType::Remainder, Value::Remainder { bits, refs }) => {
                self.store_remainder(builder, type_name, field, bits, refs)
            }
            (_, other) => Err(self.mismatch(type_name, &field.name, &field.ty.describe(), other)),
        }
    }

    /// Store a remainder payload, chaining overflow into continuation
    /// cells. Each continuation repeats the same rule, so arbitrarily
    /// large tails become a ref-linked chain.
    fn store_remainder(
        &self,
        mut builder: CellBuilder,
        type_name: &str,
        field: &FieldDef,
        bits: &BitString,
        refs: &[Arc<Cell>],
    ) -> Result<CellBuilder, CodecError> {
        let wrap = |e| write_context(type_name, &field.name, e);

        if bits.len() <= builder.spare_bits() && refs.len() <= builder.spare_refs() {
            builder = builder.store_bits(bits).map_err(wrap)?;
            for r in refs {
                builder = builder.store_ref(Arc::clone(r)).map_err(wrap)?;
            }
            return Ok(builder);
        }

        if builder.spare_refs() == 0 {
            return Err(wrap(tessera_cell::CellError::RefOverflow {
                capacity: builder.limits().max_refs,
            }));
        }

        let take_bits = bits.len().min(builder.spare_bits());
        let take_refs = refs.len().min(builder.spare_refs() - 1);
        if take_bits == 0 && take_refs == 0 && builder.bit_len() == 0 && builder.ref_count() == 0 {
            // A fresh cell cannot make progress under these limits.
            return Err(wrap(tessera_cell::CellError::BitOverflow {
                capacity: builder.limits().max_bits,
                requested: bits.len(),
            }));
        }

        builder = builder
            .store_bits(&bits.substring(0, take_bits))
            .map_err(wrap)?;
        for r in &refs[..take_refs] {
            builder = builder.store_ref(Arc::clone(r)).map_err(wrap)?;
        }

        let tail = bits.substring(take_bits, bits.len() - take_bits);
        let continuation = self
            .store_remainder(
                CellBuilder::with_limits(self.limits),
                type_name,
                field,
                &tail,
                &refs[take_refs..],
            )?
            .finish_shared();
        builder.store_ref(continuation).map_err(wrap)
    }

    fn check_uint_range(
        &self,
        type_name: &str,
        field: &FieldDef,
        value: u128,
        bits: u16,
    ) -> Result<(), CodecError> {
        if bits < 128 && value >= (1u128 << bits) {
            return Err(CodecError::ValueOutOfRange {
                type_name: type_name.to_owned(),
                field: field.name.clone(),
                reason: format!("{value} does not fit in {bits} bits"),
            });
        }
        Ok(())
    }

    fn check_int_range(
        &self,
        type_name: &str,
        field: &FieldDef,
        value: i128,
        bits: u16,
    ) -> Result<(), CodecError> {
        if bits < 128 {
            let lo = -(1i128 << (bits - 1));
            let hi = (1i128 << (bits - 1)) - 1;
            if value < lo || value > hi {
                return Err(CodecError::ValueOutOfRange {
                    type_name: type_name.to_owned(),
                    field: field.name.clone(),
                    reason: format!("{value} does not fit in {bits} signed bits"),
                });
            }
        }
        Ok(())
    }

    fn mismatch(
        &self,
        type_name: &str,
        field: &str,
        expected: &str,
        found: &Value,
    ) -> CodecError {
        CodecError::TypeMismatch {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
            expected: expected.to_owned(),
            found: found.kind(),
        }
    }
}

/// Minimal whole-byte width of `value` (0 for 0): the canonical varuint
/// length.
fn byte_width(value: u128) -> u32 {
    (128 - value.leading_zeros()).div_ceil(8)
}
