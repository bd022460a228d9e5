//! Computed layouts for records and unions.

use crate::disc::DiscriminantTrie;
use crate::field::{FieldDef, Shape};
use crate::registry::TypeId;

/// A fixed bit prefix identifying a record (and, inside a union, its
/// variant). Width 0 is legal and matches unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub value: u64,
    pub width: u8,
}

impl Opcode {
    pub fn new(value: u64, width: u8) -> Self {
        Self { value, width }
    }
}

/// Canonical layout of a record type.
///
/// Field order is declaration order and fixed for the life of the
/// registry; the codec reads and writes fields in exactly this order.
#[derive(Clone, Debug)]
pub struct RecordLayout {
    pub type_id: TypeId,
    pub name: String,
    pub opcode: Option<Opcode>,
    pub fields: Vec<FieldDef>,
    /// Static footprint including the opcode bits.
    pub shape: Shape,
    /// Index of the trailing remainder field, if any.
    pub remainder: Option<usize>,
}

impl RecordLayout {
    /// Index of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// What the dispatcher does with a discriminant no variant claims.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fail with `UnmatchedVariant` (the "throw on unknown opcode" mode).
    #[default]
    Reject,
    /// Hand the untouched slice to the caller's fallback arm.
    Fallback,
}

/// One variant of a union: a registered record plus its discriminant,
/// which is that record's opcode.
#[derive(Clone, Debug)]
pub struct UnionVariant {
    pub type_id: TypeId,
    pub name: String,
    pub discriminant: u64,
    pub width: u8,
}

/// Canonical layout of a union type.
///
/// There is no separate union tag on the wire: a union value is encoded
/// exactly as its variant record, and the variant's opcode prefix is the
/// discriminant. Variants are prefix-free by construction; `trie` is the
/// structure dispatch walks, built once at registration.
#[derive(Clone, Debug)]
pub struct UnionLayout {
    pub type_id: TypeId,
    pub name: String,
    pub variants: Vec<UnionVariant>,
    pub fallback: FallbackPolicy,
    pub trie: DiscriminantTrie,
    /// Footprint bounds across all variants.
    pub shape: Shape,
}

impl UnionLayout {
    /// Index of a variant by name.
    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }
}

/// A registered type's layout.
#[derive(Clone, Debug)]
pub enum TypeLayout {
    Record(RecordLayout),
    Union(UnionLayout),
}

impl TypeLayout {
    pub fn name(&self) -> &str {
        match self {
            TypeLayout::Record(r) => &r.name,
            TypeLayout::Union(u) => &u.name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        match self {
            TypeLayout::Record(r) => r.type_id,
            TypeLayout::Union(u) => u.type_id,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            TypeLayout::Record(r) => r.shape,
            TypeLayout::Union(u) => u.shape,
        }
    }

    pub fn as_record(&self) -> Option<&RecordLayout> {
        match self {
            TypeLayout::Record(r) => Some(r),
            TypeLayout::Union(_) => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionLayout> {
        match self {
            TypeLayout::Record(_) => None,
            TypeLayout::Union(u) => Some(u),
        }
    }
}
