//! Immutable bounded cell nodes.

use std::fmt;
use std::sync::Arc;

use crate::BitString;

/// Size bounds for a single cell node.
///
/// The canonical profile is 1023 data bits and 4 child references. Hosts
/// with a different node shape construct their own limits; nothing outside
/// `CellLimits::default()` assumes the canonical numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellLimits {
    /// Maximum data bits per cell.
    pub max_bits: u16,
    /// Maximum child references per cell.
    pub max_refs: u8,
}

impl Default for CellLimits {
    fn default() -> Self {
        Self {
            max_bits: 1023,
            max_refs: 4,
        }
    }
}

/// An immutable tree node: a bit payload plus ordered child references.
///
/// Cells are only constructed through [`CellBuilder`](crate::CellBuilder),
/// which enforces the limits it was given. Once built, a cell is never
/// mutated; readers share it freely through `Arc`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    bits: BitString,
    refs: Vec<Arc<Cell>>,
}

impl Cell {
    /// The empty cell: zero bits, zero references.
    pub fn empty() -> Self {
        Self {
            bits: BitString::new(),
            refs: Vec::new(),
        }
    }

    pub(crate) fn from_parts(bits: BitString, refs: Vec<Arc<Cell>>) -> Self {
        Self { bits, refs }
    }

    /// Number of data bits.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Number of child references.
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    /// The bit payload.
    #[inline]
    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    /// Child reference at `index`, if present.
    #[inline]
    pub fn reference(&self, index: usize) -> Option<&Arc<Cell>> {
        self.refs.get(index)
    }

    /// All child references in order.
    #[inline]
    pub fn references(&self) -> &[Arc<Cell>] {
        &self.refs
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell({} bits, {} refs)", self.bit_len(), self.ref_count())
    }
}
