//! Errors for cell construction and reading.

/// Cell-level failure.
///
/// Overflow variants are raised by [`CellBuilder`](crate::CellBuilder),
/// underflow variants by [`CellSlice`](crate::CellSlice). The codec layer
/// re-wraps underflows with field context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    #[error("cell data overflow: capacity {capacity} bits, requested {requested}")]
    BitOverflow { capacity: u16, requested: usize },

    #[error("cell reference overflow: capacity {capacity} refs")]
    RefOverflow { capacity: u8 },

    #[error("cell data underflow: requested {requested} bits, {available} available")]
    BitUnderflow { requested: usize, available: usize },

    #[error("cell reference underflow: no references left (loaded {loaded})")]
    RefUnderflow { loaded: u8 },
}
