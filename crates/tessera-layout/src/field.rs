//! Field descriptors and static shape accounting.

use crate::registry::TypeId;

/// The encoding rule for a single field.
///
/// Widths are bit counts. `VarUint` is the two-part "coins" rule: a
/// `len_bits`-wide byte-count prefix followed by that many payload bytes;
/// the registry records both parts, never a collapsed fixed width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// One bit.
    Bool,
    /// Fixed-width unsigned integer, MSB first.
    Uint { bits: u16 },
    /// Fixed-width two's complement integer.
    Int { bits: u16 },
    /// Variable-width unsigned integer: `len_bits`-wide byte count, then
    /// `count * 8` payload bits. `len_bits` must be in `1..=8`.
    VarUint { len_bits: u8 },
    /// Fixed-length raw bit string.
    Bits { len: u16 },
    /// Another registered type spliced inline: its bits (including any
    /// opcode) and refs land in the current cell.
    Inline(TypeId),
    /// Another registered type encoded into a child cell; consumes one
    /// reference slot and zero data bits.
    Ref(TypeId),
    /// An opaque child cell; consumes one reference slot.
    RawRef,
    /// Rest of message: all remaining bits and refs of the current cell.
    /// Must be the last field and non-nullable.
    Remainder,
}

impl FieldType {
    /// Short stable name used in diagnostics and the layout dump.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Bool => "bool".into(),
            FieldType::Uint { bits } => format!("uint{bits}"),
            FieldType::Int { bits } => format!("int{bits}"),
            FieldType::VarUint { len_bits } => format!("varuint{len_bits}"),
            FieldType::Bits { len } => format!("bits{len}"),
            FieldType::Inline(id) => format!("inline({id})"),
            FieldType::Ref(id) => format!("ref({id})"),
            FieldType::RawRef => "rawref".into(),
            FieldType::Remainder => "rest".into(),
        }
    }
}

/// A named field with its encoding rule and nullability.
///
/// A nullable field spends exactly one presence bit immediately before its
/// payload; when the presence bit is 0 the payload contributes no bits and
/// no refs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub nullable: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    /// Mark the field nullable (adds the presence bit).
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Static footprint of a field or record: bit and reference bounds.
///
/// `max_bits = None` means unbounded (a remainder field). Bounds are used
/// for the registration-time shape check; dynamic widths are re-checked at
/// encode time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    pub min_bits: u32,
    pub max_bits: Option<u32>,
    pub min_refs: u8,
    pub max_refs: u8,
}

impl Shape {
    pub fn fixed(bits: u32) -> Self {
        Self {
            min_bits: bits,
            max_bits: Some(bits),
            min_refs: 0,
            max_refs: 0,
        }
    }

    pub fn one_ref() -> Self {
        Self {
            min_bits: 0,
            max_bits: Some(0),
            min_refs: 1,
            max_refs: 1,
        }
    }

    /// Sequential composition: `self` then `other`.
    pub fn then(self, other: Shape) -> Shape {
        Shape {
            min_bits: self.min_bits + other.min_bits,
            max_bits: match (self.max_bits, other.max_bits) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            },
            min_refs: self.min_refs.saturating_add(other.min_refs),
            max_refs: self.max_refs.saturating_add(other.max_refs),
        }
    }

    /// Make optional: minimum drops to the single presence bit.
    pub fn nullable(self) -> Shape {
        Shape {
            min_bits: 1,
            max_bits: self.max_bits.map(|b| b + 1),
            min_refs: 0,
            max_refs: self.max_refs,
        }
    }

    /// Union of alternatives: component-wise min/max.
    pub fn either(self, other: Shape) -> Shape {
        Shape {
            min_bits: self.min_bits.min(other.min_bits),
            max_bits: match (self.max_bits, other.max_bits) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            },
            min_refs: self.min_refs.min(other.min_refs),
            max_refs: self.max_refs.max(other.max_refs),
        }
    }
}
