//! Lazy, field-on-demand decoding.

use tessera_cell::{Cell, CellSlice};
use tessera_layout::{LayoutRegistry, RecordLayout, TypeId};

use crate::decode::{check_opcode, read_field, skip_field};
use crate::error::CodecError;
use crate::value::Value;

/// Open `cell` as a lazily-decoded record of type `ty`.
///
/// The only eager work is validating a declared opcode prefix; everything
/// else waits for field access.
pub fn open_lazy<'c, 'r>(
    registry: &'r LayoutRegistry,
    cell: &'c Cell,
    ty: TypeId,
) -> Result<LazyRecord<'c, 'r>, CodecError> {
    let record = registry.record_of(ty)?;
    let mut slice = CellSlice::new(cell);
    check_opcode(record, &mut slice)?;
    Ok(LazyRecord::from_parts(registry, record, slice))
}

/// A record view that decodes fields on first access.
///
/// Two pieces of state move independently, as they must for variable-
/// width fields:
/// - the **cursor watermark**: per-field start offsets, derived by
///   skipping fields in declaration order (a skip parses only enough to
///   find the next boundary, such as a presence bit or a varuint length
///   prefix);
/// - the **value cache**: decoded values, populated only for fields the
///   caller actually reads.
///
/// Reading field 5 before field 2 therefore derives field 2's width
/// without decoding it; asking for field 2 afterwards decodes from its
/// recorded offset. The underlying cell is immutable, so cached entries
/// are never invalidated.
#[derive(Debug)]
pub struct LazyRecord<'c, 'r> {
    registry: &'r LayoutRegistry,
    layout: &'r RecordLayout,
    slice: CellSlice<'c>,
    /// Start offset (bit, ref) of each field with a known position.
    /// Invariant: the cursor sits at the start of field `offsets.len()`
    /// (or at the end of the record once all fields are consumed).
    offsets: Vec<(usize, usize)>,
    cache: Vec<Option<Value>>,
}

impl<'c, 'r> LazyRecord<'c, 'r> {
    pub(crate) fn from_parts(
        registry: &'r LayoutRegistry,
        layout: &'r RecordLayout,
        slice: CellSlice<'c>,
    ) -> Self {
        let field_count = layout.fields.len();
        Self {
            registry,
            layout,
            slice,
            offsets: Vec::with_capacity(field_count),
            cache: vec![None; field_count],
        }
    }

    /// The record layout this view decodes under.
    pub fn layout(&self) -> &'r RecordLayout {
        self.layout
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.layout.fields.len()
    }

    /// Whether a field has already been decoded and cached.
    pub fn is_cached(&self, index: usize) -> bool {
        self.cache.get(index).is_some_and(|slot| slot.is_some())
    }

    /// Decode (or fetch from cache) the field at `index`.
    pub fn field(&mut self, index: usize) -> Result<&Value, CodecError> {
        if index >= self.layout.fields.len() {
            return Err(CodecError::NoSuchField {
                type_name: self.layout.name.clone(),
                field: format!("#{index}"),
            });
        }

        // Advance the watermark to the start of `index`, skipping any
        // unaccessed field in between without decoding it.
        while self.offsets.len() <= index {
            let i = self.offsets.len();
            self.offsets.push((self.slice.bit_pos(), self.slice.ref_pos()));
            if i == index {
                break;
            }
            skip_field(
                self.registry,
                &self.layout.name,
                &self.layout.fields[i],
                &mut self.slice,
            )?;
        }

        if self.cache[index].is_none() {
            let (bit, r) = self.offsets[index];
            let value = if self.slice.bit_pos() == bit && self.slice.ref_pos() == r {
                // Cursor is parked at this field: decode through it so
                // the watermark advances.
                read_field(
                    self.registry,
                    &self.layout.name,
                    &self.layout.fields[index],
                    &mut self.slice,
                )?
            } else {
                // Field was skipped past earlier: re-derive from its
                // recorded start on a fork, leaving the cursor alone.
                let mut fork = self.slice.clone();
                fork.rewind_to(bit, r);
                read_field(
                    self.registry,
                    &self.layout.name,
                    &self.layout.fields[index],
                    &mut fork,
                )?
            };
            self.cache[index] = Some(value);
        }

        Ok(self.cache[index]
            .as_ref()
            .expect("cache populated above"))
    }

    /// Decode (or fetch from cache) a field by name.
    pub fn field_by_name(&mut self, name: &str) -> Result<&Value, CodecError> {
        let index = self
            .layout
            .field_index(name)
            .ok_or_else(|| CodecError::NoSuchField {
                type_name: self.layout.name.clone(),
                field: name.to_owned(),
            })?;
        self.field(index)
    }

    /// Force every field and collect the record value.
    pub fn materialize(&mut self) -> Result<Value, CodecError> {
        let mut fields = Vec::with_capacity(self.field_count());
        for i in 0..self.field_count() {
            fields.push(self.field(i)?.clone());
        }
        Ok(Value::Record(fields))
    }

    /// Opt-in trailing-data assertion: skips any fields not yet consumed
    /// and fails if bits or refs remain after the record.
    pub fn assert_end(&mut self) -> Result<(), CodecError> {
        while self.offsets.len() < self.layout.fields.len() {
            let i = self.offsets.len();
            self.offsets.push((self.slice.bit_pos(), self.slice.ref_pos()));
            skip_field(
                self.registry,
                &self.layout.name,
                &self.layout.fields[i],
                &mut self.slice,
            )?;
        }
        if !self.slice.is_exhausted() {
            return Err(CodecError::TrailingData {
                type_name: self.layout.name.clone(),
                bits: self.slice.remaining_bits(),
                refs: self.slice.remaining_refs(),
            });
        }
        Ok(())
    }
}
