//! Trie node cells.
//!
//! A node is `[label_len][label bits]` followed by either the value
//! payload (when the label exhausts the remaining key bits) or exactly
//! two child refs. Leaf versus branch is implied by the label length;
//! there is no flag bit.

use std::sync::Arc;

use tessera_cell::{BitString, Cell, CellBuilder, CellLimits, CellSlice};

use crate::error::{DictError, malformed_read, overflow};

/// Width of the label-length prefix: enough bits to count `0..=key_bits`.
pub(crate) fn label_width(key_bits: u16) -> u16 {
    (u16::BITS - key_bits.leading_zeros()) as u16
}

/// A parsed node. Borrows the cell it was read from.
pub(crate) enum Node<'a> {
    /// The label consumed the rest of the key; the slice holds the value.
    Leaf {
        label: BitString,
        value: CellSlice<'a>,
    },
    /// Children selected by the key bit after the label.
    Branch {
        label: BitString,
        children: [&'a Arc<Cell>; 2],
    },
}

impl Node<'_> {
    pub(crate) fn label(&self) -> &BitString {
        match self {
            Node::Leaf { label, .. } | Node::Branch { label, .. } => label,
        }
    }
}

/// Parse a node cell with `remaining` key bits left to resolve.
pub(crate) fn parse(cell: &Cell, remaining: usize, lw: u16) -> Result<Node<'_>, DictError> {
    let mut slice = CellSlice::new(cell);
    let label_len = slice.load_uint(lw).map_err(malformed_read)? as usize;
    if label_len > remaining {
        return Err(DictError::Malformed {
            reason: format!("label of {label_len} bits exceeds {remaining} remaining key bits"),
        });
    }
    let label = slice.load_bits(label_len).map_err(malformed_read)?;
    if label_len == remaining {
        return Ok(Node::Leaf {
            label,
            value: slice,
        });
    }
    if slice.remaining_bits() != 0 || slice.remaining_refs() != 2 {
        return Err(DictError::Malformed {
            reason: format!(
                "branch node carries {} bits and {} refs after the label",
                slice.remaining_bits(),
                slice.remaining_refs()
            ),
        });
    }
    let left = slice.load_ref().map_err(malformed_read)?;
    let right = slice.load_ref().map_err(malformed_read)?;
    Ok(Node::Branch {
        label,
        children: [left, right],
    })
}

/// Rebuild a leaf's value payload as a standalone cell.
pub(crate) fn value_of(mut payload: CellSlice<'_>, limits: CellLimits) -> Result<Cell, DictError> {
    let (bits, refs) = payload.load_remainder();
    let mut builder = CellBuilder::with_limits(limits)
        .store_bits(&bits)
        .map_err(malformed_read)?;
    for r in refs {
        builder = builder.store_ref(r).map_err(malformed_read)?;
    }
    Ok(builder.finish())
}

/// Build a leaf node: label, then the value's bits and refs.
pub(crate) fn leaf(
    label: &BitString,
    value: &Cell,
    lw: u16,
    limits: CellLimits,
) -> Result<Arc<Cell>, DictError> {
    let mut builder = CellBuilder::with_limits(limits)
        .store_uint(label.len() as u128, lw)
        .map_err(overflow)?
        .store_bits(label)
        .map_err(overflow)?
        .store_bits(value.bits())
        .map_err(overflow)?;
    for r in value.references() {
        builder = builder.store_ref(Arc::clone(r)).map_err(overflow)?;
    }
    Ok(builder.finish_shared())
}

/// Build a branch node: label, then the two children.
pub(crate) fn branch(
    label: &BitString,
    left: Arc<Cell>,
    right: Arc<Cell>,
    lw: u16,
    limits: CellLimits,
) -> Result<Arc<Cell>, DictError> {
    Ok(CellBuilder::with_limits(limits)
        .store_uint(label.len() as u128, lw)
        .map_err(overflow)?
        .store_bits(label)
        .map_err(overflow)?
        .store_ref(left)
        .map_err(overflow)?
        .store_ref(right)
        .map_err(overflow)?
        .finish_shared())
}

/// Rebuild an existing node under a different label, keeping its payload
/// (value or children) bit-for-bit.
pub(crate) fn relabel(
    cell: &Cell,
    old_label_len: usize,
    new_label: &BitString,
    lw: u16,
    limits: CellLimits,
) -> Result<Arc<Cell>, DictError> {
    let mut slice = CellSlice::new(cell);
    slice
        .skip_bits(lw as usize + old_label_len)
        .map_err(malformed_read)?;
    let (tail_bits, tail_refs) = slice.load_remainder();

    let mut builder = CellBuilder::with_limits(limits)
        .store_uint(new_label.len() as u128, lw)
        .map_err(overflow)?
        .store_bits(new_label)
        .map_err(overflow)?
        .store_bits(&tail_bits)
        .map_err(overflow)?;
    for r in tail_refs {
        builder = builder.store_ref(r).map_err(overflow)?;
    }
    Ok(builder.finish_shared())
}
