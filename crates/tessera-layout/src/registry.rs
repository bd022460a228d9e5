//! The layout registry.
//!
//! One registry per compilation or execution unit, constructed explicitly
//! and passed by reference to whatever needs layout lookups. There is no
//! ambient global registry.

use std::fmt;

use indexmap::IndexMap;
use tessera_cell::CellLimits;

use crate::disc::DiscriminantTrie;
use crate::error::LayoutError;
use crate::field::{FieldDef, FieldType, Shape};
use crate::layout::{FallbackPolicy, Opcode, RecordLayout, TypeLayout, UnionLayout, UnionVariant};

/// Handle to a registered type. Cheap to copy; only meaningful for the
/// registry that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct TypeId(pub u16);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Registry of type layouts.
///
/// Registration validates everything that can be validated statically:
/// width rules, opcode ranges, remainder placement, discriminant
/// prefix-freeness, and whether the minimum footprint fits the cell
/// limits. After registration a layout is immutable and lookups are pure.
#[derive(Debug, Default)]
pub struct LayoutRegistry {
    limits: CellLimits,
    names: IndexMap<String, TypeId>,
    layouts: Vec<TypeLayout>,
}

impl LayoutRegistry {
    /// Registry checking against the canonical cell profile.
    pub fn new() -> Self {
        Self::with_limits(CellLimits::default())
    }

    /// Registry checking against explicit cell limits.
    pub fn with_limits(limits: CellLimits) -> Self {
        Self {
            limits,
            names: IndexMap::new(),
            layouts: Vec::new(),
        }
    }

    /// The cell limits layouts are validated against.
    pub fn limits(&self) -> CellLimits {
        self.limits
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Iterate layouts in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeLayout> {
        self.layouts.iter()
    }

    /// Resolve a type name.
    pub fn resolve(&self, name: &str) -> Result<TypeId, LayoutError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| LayoutError::UnknownType(name.to_owned()))
    }

    /// Pure layout lookup.
    pub fn layout_of(&self, id: TypeId) -> Result<&TypeLayout, LayoutError> {
        self.layouts
            .get(id.0 as usize)
            .ok_or(LayoutError::UnknownTypeId(id))
    }

    /// Layout lookup requiring a record.
    pub fn record_of(&self, id: TypeId) -> Result<&RecordLayout, LayoutError> {
        let layout = self.layout_of(id)?;
        layout.as_record().ok_or_else(|| LayoutError::KindMismatch {
            name: layout.name().to_owned(),
            expected: "record",
        })
    }

    /// Layout lookup requiring a union.
    pub fn union_of(&self, id: TypeId) -> Result<&UnionLayout, LayoutError> {
        let layout = self.layout_of(id)?;
        layout.as_union().ok_or_else(|| LayoutError::KindMismatch {
            name: layout.name().to_owned(),
            expected: "union",
        })
    }

    fn claim_name(&mut self, name: &str) -> Result<TypeId, LayoutError> {
        if self.names.contains_key(name) {
            return Err(LayoutError::DuplicateType(name.to_owned()));
        }
        let id = TypeId(self.layouts.len() as u16);
        self.names.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Register a record type.
    ///
    /// `opcode`, when present, is a fixed prefix written before the first
    /// field and validated eagerly on decode. Fails with
    /// [`LayoutError::AmbiguousWidth`] for unresolvable width rules and
    /// [`LayoutError::ShapeOverflow`] when the minimum footprint cannot
    /// fit a cell.
    pub fn register_record(
        &mut self,
        name: &str,
        opcode: Option<Opcode>,
        fields: Vec<FieldDef>,
    ) -> Result<TypeId, LayoutError> {
        if let Some(op) = opcode {
            validate_opcode(name, op)?;
        }

        let mut shape = Shape::fixed(opcode.map_or(0, |op| op.width as u32));
        let mut remainder = None;
        for (index, field) in fields.iter().enumerate() {
            self.validate_field(name, field, index, fields.len())?;
            if field.ty == FieldType::Remainder {
                remainder = Some(index);
            }
            let mut field_shape = self.field_shape(&field.ty)?;
            if field.nullable {
                field_shape = field_shape.nullable();
            }
            shape = shape.then(field_shape);
        }

        if shape.min_bits > self.limits.max_bits as u32 {
            return Err(LayoutError::ShapeOverflow {
                type_name: name.to_owned(),
                kind: "bits",
                needed: shape.min_bits,
                capacity: self.limits.max_bits as u32,
            });
        }
        if shape.min_refs > self.limits.max_refs {
            return Err(LayoutError::ShapeOverflow {
                type_name: name.to_owned(),
                kind: "refs",
                needed: shape.min_refs as u32,
                capacity: self.limits.max_refs as u32,
            });
        }

        let id = self.claim_name(name)?;
        self.layouts.push(TypeLayout::Record(RecordLayout {
            type_id: id,
            name: name.to_owned(),
            opcode,
            fields,
            shape,
            remainder,
        }));
        Ok(id)
    }

    /// Register a union over previously registered record variants.
    ///
    /// Each variant record's opcode is its discriminant; variants without
    /// an opcode are rejected, and so is any pair of discriminants that is
    /// not prefix-free (one being a strict prefix of the other counts as a
    /// collision, not a precedence rule).
    pub fn register_union(
        &mut self,
        name: &str,
        variant_ids: &[TypeId],
        fallback: FallbackPolicy,
    ) -> Result<TypeId, LayoutError> {
        let mut trie = DiscriminantTrie::new();
        let mut variants: Vec<UnionVariant> = Vec::with_capacity(variant_ids.len());
        let mut shape: Option<Shape> = None;

        for (index, &vid) in variant_ids.iter().enumerate() {
            let record = self.record_of(vid)?;
            let op = record.opcode.ok_or_else(|| LayoutError::MissingDiscriminant {
                union: name.to_owned(),
                variant: record.name.clone(),
            })?;
            if let Err(collision) = trie.insert(op.value, op.width, index as u16) {
                return Err(LayoutError::AmbiguousDiscriminant {
                    union: name.to_owned(),
                    first: variants[collision.existing as usize].name.clone(),
                    second: record.name.clone(),
                });
            }
            variants.push(UnionVariant {
                type_id: vid,
                name: record.name.clone(),
                discriminant: op.value,
                width: op.width,
            });
            shape = Some(match shape {
                Some(s) => s.either(record.shape),
                None => record.shape,
            });
        }

        let id = self.claim_name(name)?;
        self.layouts.push(TypeLayout::Union(UnionLayout {
            type_id: id,
            name: name.to_owned(),
            variants,
            fallback,
            trie,
            shape: shape.unwrap_or_default(),
        }));
        Ok(id)
    }

    /// Static footprint of a single field rule.
    pub fn field_shape(&self, ty: &FieldType) -> Result<Shape, LayoutError> {
        Ok(match ty {
            FieldType::Bool => Shape::fixed(1),
            FieldType::Uint { bits } | FieldType::Int { bits } => Shape::fixed(*bits as u32),
            FieldType::VarUint { len_bits } => {
                let max_bytes = (1u32 << *len_bits) - 1;
                Shape {
                    min_bits: *len_bits as u32,
                    max_bits: Some(*len_bits as u32 + max_bytes * 8),
                    min_refs: 0,
                    max_refs: 0,
                }
            }
            FieldType::Bits { len } => Shape::fixed(*len as u32),
            FieldType::Inline(id) => self.layout_of(*id)?.shape(),
            FieldType::Ref(id) => {
                self.layout_of(*id)?;
                Shape::one_ref()
            }
            FieldType::RawRef => Shape::one_ref(),
            FieldType::Remainder => Shape {
                min_bits: 0,
                max_bits: None,
                min_refs: 0,
                max_refs: 0,
            },
        })
    }

    fn validate_field(
        &self,
        type_name: &str,
        field: &FieldDef,
        index: usize,
        field_count: usize,
    ) -> Result<(), LayoutError> {
        let ambiguous = |reason: String| LayoutError::AmbiguousWidth {
            type_name: type_name.to_owned(),
            field: field.name.clone(),
            reason,
        };
        match &field.ty {
            FieldType::Uint { bits } | FieldType::Int { bits } => {
                if *bits == 0 || *bits > 128 {
                    return Err(ambiguous(format!("integer width {bits} out of 1..=128")));
                }
            }
            FieldType::VarUint { len_bits } => {
                if *len_bits == 0 || *len_bits > 8 {
                    return Err(ambiguous(format!(
                        "variable-width length prefix {len_bits} out of 1..=8"
                    )));
                }
            }
            FieldType::Remainder => {
                if index + 1 != field_count {
                    return Err(ambiguous("remainder field must be last".into()));
                }
                if field.nullable {
                    return Err(ambiguous("remainder field cannot be nullable".into()));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn validate_opcode(type_name: &str, op: Opcode) -> Result<(), LayoutError> {
    let invalid = op.width > 64 || (op.width < 64 && op.value >= (1u64 << op.width));
    if invalid {
        return Err(LayoutError::InvalidOpcode {
            type_name: type_name.to_owned(),
            value: op.value,
            width: op.width,
        });
    }
    Ok(())
}
