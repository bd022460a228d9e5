//! The persistent dictionary.

use std::cmp::Ordering;
use std::sync::Arc;

use tessera_cell::{BitString, Cell, CellLimits};

use crate::error::DictError;
use crate::key::{KeyOrder, decode_key, encode_key};
use crate::node::{self, Node};

/// Result of a point or navigation lookup.
///
/// An absent key is not an error: `found()` is false and `value` is
/// `None`. For misses the `key` echoes the query (or 0 for `first`/`last`
/// on an empty dictionary).
#[derive(Clone, Debug)]
pub struct MapEntry {
    pub key: i128,
    pub value: Option<Cell>,
}

impl MapEntry {
    /// Whether the lookup produced a value.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn miss(key: i128) -> Self {
        Self { key, value: None }
    }
}

/// A persistent map from fixed-width integer keys to cells, stored as a
/// binary radix trie of cells.
///
/// Every mutator returns a new `Dictionary` and leaves the receiver
/// untouched; unchanged subtrees are shared between the old and new
/// versions through their `Arc`s. Entries iterate in key order, which for
/// [`KeyOrder::Signed`] is numeric order.
#[derive(Clone, Debug)]
pub struct Dictionary {
    pub(crate) root: Option<Arc<Cell>>,
    pub(crate) key_bits: u16,
    pub(crate) key_order: KeyOrder,
    pub(crate) limits: CellLimits,
}

impl Dictionary {
    /// Empty dictionary with `key_bits`-wide keys under the canonical
    /// cell profile.
    ///
    /// # Panics
    /// Panics if `key_bits` is 0 or exceeds 127 (keys are `i128`).
    pub fn new(key_bits: u16, key_order: KeyOrder) -> Self {
        Self::with_limits(key_bits, key_order, CellLimits::default())
    }

    /// Empty dictionary validated against explicit cell limits.
    pub fn with_limits(key_bits: u16, key_order: KeyOrder, limits: CellLimits) -> Self {
        assert!(
            key_bits >= 1 && key_bits <= 127,
            "key width {key_bits} out of 1..=127"
        );
        Self {
            root: None,
            key_bits,
            key_order,
            limits,
        }
    }

    /// Attach to an existing root cell, e.g. one decoded out of a larger
    /// structure. The root is validated lazily, on access.
    pub fn from_root(
        root: Arc<Cell>,
        key_bits: u16,
        key_order: KeyOrder,
        limits: CellLimits,
    ) -> Self {
        let mut dict = Self::with_limits(key_bits, key_order, limits);
        dict.root = Some(root);
        dict
    }

    /// The root cell, if any entry exists.
    pub fn root(&self) -> Option<&Arc<Cell>> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Key width in bits.
    pub fn key_bits(&self) -> u16 {
        self.key_bits
    }

    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }

    fn lw(&self) -> u16 {
        node::label_width(self.key_bits)
    }

    fn with_root(&self, root: Option<Arc<Cell>>) -> Self {
        let mut next = self.clone();
        next.root = root;
        next
    }

    /// Point lookup.
    pub fn get(&self, key: i128) -> Result<MapEntry, DictError> {
        let path = encode_key(key, self.key_bits, self.key_order)?;
        let Some(root) = &self.root else {
            return Ok(MapEntry::miss(key));
        };

        let mut cell: &Cell = root;
        let mut pos = 0;
        loop {
            match node::parse(cell, self.key_bits as usize - pos, self.lw())? {
                Node::Leaf { label, value } => {
                    if !matches_at(&label, &path, pos) {
                        return Ok(MapEntry::miss(key));
                    }
                    return Ok(MapEntry {
                        key,
                        value: Some(node::value_of(value, self.limits)?),
                    });
                }
                Node::Branch { label, children } => {
                    if !matches_at(&label, &path, pos) {
                        return Ok(MapEntry::miss(key));
                    }
                    pos += label.len();
                    let bit = path.bit(pos);
                    pos += 1;
                    cell = children[bit as usize];
                }
            }
        }
    }

    /// Insert or replace. Returns the new dictionary; `self` is unchanged.
    pub fn set(&self, key: i128, value: &Cell) -> Result<Dictionary, DictError> {
        let path = encode_key(key, self.key_bits, self.key_order)?;
        let root = self.set_at(self.root.as_deref(), &path, 0, value)?;
        Ok(self.with_root(Some(root)))
    }

    /// Insert only when the key is absent. The flag reports whether an
    /// insert happened.
    pub fn set_if_absent(&self, key: i128, value: &Cell) -> Result<(Dictionary, bool), DictError> {
        if self.get(key)?.found() {
            return Ok((self.clone(), false));
        }
        Ok((self.set(key, value)?, true))
    }

    /// Replace only when the key is present. The flag reports whether a
    /// replace happened.
    pub fn set_if_present(&self, key: i128, value: &Cell) -> Result<(Dictionary, bool), DictError> {
        if !self.get(key)?.found() {
            return Ok((self.clone(), false));
        }
        Ok((self.set(key, value)?, true))
    }

    /// Remove a key. The flag reports whether the key was present.
    pub fn remove(&self, key: i128) -> Result<(Dictionary, bool), DictError> {
        let path = encode_key(key, self.key_bits, self.key_order)?;
        let Some(root) = &self.root else {
            return Ok((self.clone(), false));
        };
        match self.remove_at(root, &path, 0)? {
            None => Ok((self.clone(), false)),
            Some(new_root) => Ok((self.with_root(new_root), true)),
        }
    }

    /// Smallest key.
    pub fn first(&self) -> Result<MapEntry, DictError> {
        self.edge(false)
    }

    /// Largest key.
    pub fn last(&self) -> Result<MapEntry, DictError> {
        self.edge(true)
    }

    /// Smallest key strictly greater than `pivot`.
    pub fn next(&self, pivot: i128) -> Result<MapEntry, DictError> {
        self.seek(pivot, false, true)
    }

    /// Smallest key greater than or equal to `pivot`.
    pub fn next_or_equal(&self, pivot: i128) -> Result<MapEntry, DictError> {
        self.seek(pivot, true, true)
    }

    /// Largest key strictly less than `pivot`.
    pub fn prev(&self, pivot: i128) -> Result<MapEntry, DictError> {
        self.seek(pivot, false, false)
    }

    /// Largest key less than or equal to `pivot`.
    pub fn prev_or_equal(&self, pivot: i128) -> Result<MapEntry, DictError> {
        self.seek(pivot, true, false)
    }

    fn set_at(
        &self,
        cell: Option<&Cell>,
        path: &BitString,
        pos: usize,
        value: &Cell,
    ) -> Result<Arc<Cell>, DictError> {
        let remaining = self.key_bits as usize - pos;
        let Some(cell) = cell else {
            return node::leaf(&path.substring(pos, remaining), value, self.lw(), self.limits);
        };

        let parsed = node::parse(cell, remaining, self.lw())?;
        let label = parsed.label();
        let common = common_with_path(label, path, pos);

        if common < label.len() {
            // Paths diverge inside the label: split into a branch at the
            // divergence bit. The old node keeps its tail under a
            // shortened label; the divergence bit itself moves into the
            // branch edge.
            let old_bit = label.bit(common);
            let old = node::relabel(
                cell,
                label.len(),
                &label.substring(common + 1, label.len() - common - 1),
                self.lw(),
                self.limits,
            )?;
            let new = node::leaf(
                &path.substring(pos + common + 1, remaining - common - 1),
                value,
                self.lw(),
                self.limits,
            )?;
            let (left, right) = if old_bit { (new, old) } else { (old, new) };
            return node::branch(
                &label.substring(0, common),
                left,
                right,
                self.lw(),
                self.limits,
            );
        }

        match parsed {
            Node::Leaf { label, .. } => {
                // Full label match on a leaf is the whole key: replace.
                node::leaf(&label, value, self.lw(), self.limits)
            }
            Node::Branch { label, children } => {
                let bit = path.bit(pos + label.len());
                let child_pos = pos + label.len() + 1;
                let rebuilt = self.set_at(Some(children[bit as usize]), path, child_pos, value)?;
                let (left, right) = if bit {
                    (Arc::clone(children[0]), rebuilt)
                } else {
                    (rebuilt, Arc::clone(children[1]))
                };
                node::branch(&label, left, right, self.lw(), self.limits)
            }
        }
    }

    /// Outer `None` means the key was not found. `Some(None)` means the
    /// subtree became empty; `Some(Some(cell))` is the rebuilt subtree.
    fn remove_at(
        &self,
        cell: &Cell,
        path: &BitString,
        pos: usize,
    ) -> Result<Option<Option<Arc<Cell>>>, DictError> {
        match node::parse(cell, self.key_bits as usize - pos, self.lw())? {
            Node::Leaf { label, .. } => {
                if matches_at(&label, path, pos) {
                    Ok(Some(None))
                } else {
                    Ok(None)
                }
            }
            Node::Branch { label, children } => {
                if !matches_at(&label, path, pos) {
                    return Ok(None);
                }
                let bit = path.bit(pos + label.len());
                let child_pos = pos + label.len() + 1;
                match self.remove_at(children[bit as usize], path, child_pos)? {
                    None => Ok(None),
                    Some(Some(rebuilt)) => {
                        let (left, right) = if bit {
                            (Arc::clone(children[0]), rebuilt)
                        } else {
                            (rebuilt, Arc::clone(children[1]))
                        };
                        Ok(Some(Some(node::branch(
                            &label,
                            left,
                            right,
                            self.lw(),
                            self.limits,
                        )?)))
                    }
                    Some(None) => {
                        // One child left: pull the sibling up, folding this
                        // label and the sibling's edge bit into its label.
                        let sibling = children[1 - bit as usize];
                        let sib_remaining = self.key_bits as usize - child_pos;
                        let sib_label =
                            node::parse(sibling, sib_remaining, self.lw())?.label().clone();
                        let mut merged = label.clone();
                        merged.push_bit(!bit);
                        merged.append(&sib_label);
                        Ok(Some(Some(node::relabel(
                            sibling,
                            sib_label.len(),
                            &merged,
                            self.lw(),
                            self.limits,
                        )?)))
                    }
                }
            }
        }
    }

    fn edge(&self, side: bool) -> Result<MapEntry, DictError> {
        let Some(root) = &self.root else {
            return Ok(MapEntry::miss(0));
        };
        let (bits, value) = self.extreme_from(root, BitString::new(), side)?;
        Ok(MapEntry {
            key: decode_key(&bits, self.key_bits, self.key_order),
            value: Some(value),
        })
    }

    /// Descend to the smallest (`side == false`) or largest key under
    /// `cell`, whose keys all start with `prefix`.
    fn extreme_from(
        &self,
        cell: &Cell,
        mut prefix: BitString,
        side: bool,
    ) -> Result<(BitString, Cell), DictError> {
        let mut cell = cell;
        loop {
            match node::parse(cell, self.key_bits as usize - prefix.len(), self.lw())? {
                Node::Leaf { label, value } => {
                    prefix.append(&label);
                    return Ok((prefix, node::value_of(value, self.limits)?));
                }
                Node::Branch { label, children } => {
                    prefix.append(&label);
                    prefix.push_bit(side);
                    cell = children[side as usize];
                }
            }
        }
    }

    fn seek(&self, pivot: i128, inclusive: bool, forward: bool) -> Result<MapEntry, DictError> {
        let path = encode_key(pivot, self.key_bits, self.key_order)?;
        let Some(root) = &self.root else {
            return Ok(MapEntry::miss(pivot));
        };
        match self.seek_at(root, &path, 0, inclusive, forward)? {
            Some((bits, value)) => Ok(MapEntry {
                key: decode_key(&bits, self.key_bits, self.key_order),
                value: Some(value),
            }),
            None => Ok(MapEntry::miss(pivot)),
        }
    }

    fn seek_at(
        &self,
        cell: &Cell,
        path: &BitString,
        pos: usize,
        inclusive: bool,
        forward: bool,
    ) -> Result<Option<(BitString, Cell)>, DictError> {
        let parsed = node::parse(cell, self.key_bits as usize - pos, self.lw())?;
        let label = parsed.label();

        match cmp_with_path(label, path, pos) {
            Ordering::Greater => {
                // Every key below here is beyond the pivot prefix.
                if forward {
                    self.extreme_from(cell, path.substring(0, pos), false)
                        .map(Some)
                } else {
                    Ok(None)
                }
            }
            Ordering::Less => {
                if forward {
                    Ok(None)
                } else {
                    self.extreme_from(cell, path.substring(0, pos), true)
                        .map(Some)
                }
            }
            Ordering::Equal => match parsed {
                Node::Leaf { label, value } => {
                    // Label equal over the whole remaining key: this leaf
                    // is exactly the pivot.
                    if !inclusive {
                        return Ok(None);
                    }
                    let mut full = path.substring(0, pos);
                    full.append(&label);
                    Ok(Some((full, node::value_of(value, self.limits)?)))
                }
                Node::Branch { label, children } => {
                    let bit = path.bit(pos + label.len());
                    let child_pos = pos + label.len() + 1;
                    let toward_pivot = children[bit as usize];
                    if let Some(hit) =
                        self.seek_at(toward_pivot, path, child_pos, inclusive, forward)?
                    {
                        return Ok(Some(hit));
                    }
                    // The pivot-side subtree is exhausted; the other child
                    // lies entirely past the pivot in the seek direction.
                    if bit == forward {
                        return Ok(None);
                    }
                    let mut prefix = path.substring(0, pos);
                    prefix.append(&label);
                    prefix.push_bit(forward);
                    self.extreme_from(children[forward as usize], prefix, !forward)
                        .map(Some)
                }
            },
        }
    }
}

/// Whether `label` equals `path[pos .. pos + label.len()]`.
fn matches_at(label: &BitString, path: &BitString, pos: usize) -> bool {
    (0..label.len()).all(|i| label.bit(i) == path.bit(pos + i))
}

/// Length of the common prefix of `label` and `path[pos..]`.
fn common_with_path(label: &BitString, path: &BitString, pos: usize) -> usize {
    let mut i = 0;
    while i < label.len() && label.bit(i) == path.bit(pos + i) {
        i += 1;
    }
    i
}

/// Lexicographic order of `label` against the same-length slice of `path`.
fn cmp_with_path(label: &BitString, path: &BitString, pos: usize) -> Ordering {
    for i in 0..label.len() {
        match (label.bit(i), path.bit(pos + i)) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}
