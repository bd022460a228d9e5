//! Codec errors.
//!
//! Every variant names the type (and field, where one exists) it was
//! raised for: an abort in the host must be attributable to a specific
//! field, variant or size violation. None of these are retried; the
//! codec is deterministic, so the same input fails the same way.

use tessera_cell::CellError;
use tessera_layout::LayoutError;

/// Encode/decode/dispatch failure.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Layout lookup failed mid-operation.
    #[error("layout: {0}")]
    Layout(#[from] LayoutError),

    /// Encoded data does not fit the cell and no remainder field absorbs
    /// the overflow.
    #[error("encoding `{type_name}.{field}` exceeds cell size: {source}")]
    SizeExceeded {
        type_name: String,
        field: String,
        source: CellError,
    },

    /// Fewer bits available than the field requires.
    #[error(
        "truncated data in `{type_name}.{field}`: needed {requested} bits, {available} available"
    )]
    Truncated {
        type_name: String,
        field: String,
        requested: usize,
        available: usize,
    },

    /// A reference slot the field requires is missing.
    #[error("truncated data in `{type_name}.{field}`: reference missing")]
    TruncatedRef { type_name: String, field: String },

    /// Strict decode finished with unread bits or refs.
    #[error("trailing data after `{type_name}`: {bits} bits, {refs} refs unread")]
    TrailingData {
        type_name: String,
        bits: usize,
        refs: usize,
    },

    /// A declared fixed opcode prefix did not match at open time.
    #[error("opcode mismatch opening `{type_name}`: expected {expected:#x}, found {found:#x}")]
    OpcodeMismatch {
        type_name: String,
        expected: u64,
        found: u64,
    },

    /// No variant discriminant matched and no fallback was available.
    #[error("no variant of `{union}` matches the discriminant")]
    UnmatchedVariant { union: String },

    /// The value handed to the encoder does not have the shape the layout
    /// demands.
    #[error("type mismatch in `{type_name}.{field}`: expected {expected}, got {found}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
        found: &'static str,
    },

    /// A numeric value cannot be represented under the field's width rule.
    #[error("value out of range in `{type_name}.{field}`: {reason}")]
    ValueOutOfRange {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Field access by an unknown index or name.
    #[error("`{type_name}` has no field `{field}`")]
    NoSuchField { type_name: String, field: String },

    /// A match arm names a variant the union does not declare.
    #[error("match arm `{variant}` is not a variant of `{union}`")]
    UnknownArm { union: String, variant: String },
}

/// Wrap a cell-level read error with type/field context.
pub(crate) fn read_context(type_name: &str, field: &str, err: CellError) -> CodecError {
    match err {
        CellError::BitUnderflow {
            requested,
            available,
        } => CodecError::Truncated {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
            requested,
            available,
        },
        CellError::RefUnderflow { .. } => CodecError::TruncatedRef {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
        },
        overflow => CodecError::SizeExceeded {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
            source: overflow,
        },
    }
}

/// Wrap a cell-level write error with type/field context.
pub(crate) fn write_context(type_name: &str, field: &str, err: CellError) -> CodecError {
    CodecError::SizeExceeded {
        type_name: type_name.to_owned(),
        field: field.to_owned(),
        source: err,
    }
}
