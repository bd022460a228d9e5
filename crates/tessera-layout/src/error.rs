//! Layout registration and lookup errors.
//!
//! Every variant is fatal to the registration or lookup that raised it;
//! the registry never partially registers a type.

use crate::registry::TypeId;

/// Layout-time failure.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// Name lookup failed.
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// Id lookup failed (stale or foreign TypeId).
    #[error("unknown type id {0}")]
    UnknownTypeId(TypeId),

    /// A type with this name is already registered.
    #[error("duplicate type `{0}`")]
    DuplicateType(String),

    /// A field's bit width cannot be resolved at registration time.
    #[error("ambiguous width in `{type_name}.{field}`: {reason}")]
    AmbiguousWidth {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Two union variants are not distinguishable by their prefix bits.
    /// Raised both for equal colliding discriminants and for pairs where
    /// one discriminant is a strict prefix of the other.
    #[error("ambiguous discriminant in union `{union}`: `{first}` vs `{second}`")]
    AmbiguousDiscriminant {
        union: String,
        first: String,
        second: String,
    },

    /// A union variant's record declares no opcode, so it has no
    /// discriminant.
    #[error("union `{union}` variant `{variant}` has no opcode prefix")]
    MissingDiscriminant { union: String, variant: String },

    /// Opcode value does not fit its declared width, or the width is
    /// out of range.
    #[error("invalid opcode on `{type_name}`: value {value:#x} at width {width}")]
    InvalidOpcode {
        type_name: String,
        value: u64,
        width: u8,
    },

    /// The record's minimum footprint already exceeds the cell limits.
    #[error("shape of `{type_name}` exceeds cell limits: needs {needed} {kind}, capacity {capacity}")]
    ShapeOverflow {
        type_name: String,
        kind: &'static str,
        needed: u32,
        capacity: u32,
    },

    /// A record layout was required but the type is a union, or vice
    /// versa.
    #[error("type `{name}` is not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
    },

    /// Schema document failed to parse.
    #[error("schema: {0}")]
    Schema(String),

    /// Schema document is not valid JSON.
    #[error("schema json: {0}")]
    SchemaJson(#[from] serde_json::Error),
}
