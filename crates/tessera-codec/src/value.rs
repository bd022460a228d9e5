//! Typed values the codec reads and writes.

use std::sync::Arc;

use tessera_cell::{BitString, Cell};

/// A decoded (or to-be-encoded) value.
///
/// The shape mirrors the field model: records hold their field values in
/// layout order, union values are a variant index plus the variant
/// record's fields, typed refs hold the child's decoded value directly.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Uint(u128),
    Int(i128),
    /// Variable-width unsigned integer ("coins").
    VarUint(u128),
    /// Fixed-length raw bits.
    Bits(BitString),
    /// An absent nullable field.
    Null,
    /// An opaque child cell (raw ref fields).
    Ref(Arc<Cell>),
    /// Record field values in declaration order.
    Record(Vec<Value>),
    /// A union value: variant index within the union, then the variant
    /// record's field values.
    Variant { index: usize, fields: Vec<Value> },
    /// Rest-of-message payload: remaining bits and refs of the cell.
    Remainder {
        bits: BitString,
        refs: Vec<Arc<Cell>>,
    },
}

impl Value {
    /// Stable kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Uint(_) => "uint",
            Value::Int(_) => "int",
            Value::VarUint(_) => "varuint",
            Value::Bits(_) => "bits",
            Value::Null => "null",
            Value::Ref(_) => "ref",
            Value::Record(_) => "record",
            Value::Variant { .. } => "variant",
            Value::Remainder { .. } => "remainder",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Value::Uint(v) | Value::VarUint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&[Value]> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Shorthand for a record value.
    pub fn record(fields: impl Into<Vec<Value>>) -> Self {
        Value::Record(fields.into())
    }

    /// Shorthand for a union value.
    pub fn variant(index: usize, fields: impl Into<Vec<Value>>) -> Self {
        Value::Variant {
            index,
            fields: fields.into(),
        }
    }
}
