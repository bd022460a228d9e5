//! In-order traversal.

use std::sync::Arc;

use tessera_cell::{BitString, Cell};

use crate::dict::Dictionary;
use crate::error::DictError;
use crate::key::decode_key;
use crate::node::{self, Node};

impl Dictionary {
    /// Iterate entries in key order. A malformed node ends the iteration
    /// with an `Err` item.
    pub fn iter(&self) -> Iter<'_> {
        let mut stack = Vec::new();
        if let Some(root) = &self.root {
            stack.push((root, BitString::new()));
        }
        Iter { dict: self, stack }
    }
}

/// In-order iterator over dictionary entries.
pub struct Iter<'a> {
    dict: &'a Dictionary,
    stack: Vec<(&'a Arc<Cell>, BitString)>,
}

impl Iterator for Iter<'_> {
    type Item = Result<(i128, Cell), DictError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (cell, prefix) = self.stack.pop()?;
            let remaining = self.dict.key_bits as usize - prefix.len();
            let lw = node::label_width(self.dict.key_bits);
            match node::parse(cell, remaining, lw) {
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
                Ok(Node::Leaf { label, value }) => {
                    let mut full = prefix;
                    full.append(&label);
                    let key = decode_key(&full, self.dict.key_bits, self.dict.key_order);
                    match node::value_of(value, self.dict.limits) {
                        Ok(cell) => return Some(Ok((key, cell))),
                        Err(e) => {
                            self.stack.clear();
                            return Some(Err(e));
                        }
                    }
                }
                Ok(Node::Branch { label, children }) => {
                    let mut base = prefix;
                    base.append(&label);
                    let mut right = base.clone();
                    right.push_bit(true);
                    base.push_bit(false);
                    // Left on top so it pops first.
                    self.stack.push((children[1], right));
                    self.stack.push((children[0], base));
                }
            }
        }
    }
}
