//! Binary prefix trie over union discriminants.
//!
//! Built once when a union is registered. Insertion enforces
//! prefix-freeness in both directions: a new discriminant may neither pass
//! through an existing terminal nor stop on a node that already has
//! descendants. Resolution walks bit-by-bit and stops at the first
//! terminal, so dispatch never reads past the shortest disambiguating
//! prefix.

use tessera_cell::{CellError, CellSlice};

#[derive(Clone, Debug, Default)]
struct Node {
    children: [Option<Box<Node>>; 2],
    /// Variant index terminating here.
    terminal: Option<u16>,
}

impl Node {
    fn has_children(&self) -> bool {
        self.children[0].is_some() || self.children[1].is_some()
    }
}

/// Prefix-free discriminant table.
#[derive(Clone, Debug, Default)]
pub struct DiscriminantTrie {
    root: Node,
    len: usize,
}

/// Insertion conflict: the new discriminant is not prefix-free against an
/// existing one. Carries the variant index already occupying the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixCollision {
    pub existing: u16,
}

impl DiscriminantTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of discriminants inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `value` at `width` bits (MSB first) terminating in
    /// `variant`. Fails if the path collides with an existing entry.
    pub fn insert(&mut self, value: u64, width: u8, variant: u16) -> Result<(), PrefixCollision> {
        // Walk first without mutating so a failed insert leaves the trie
        // untouched.
        let mut probe: &Node = &self.root;
        for i in (0..width).rev() {
            if let Some(existing) = probe.terminal {
                // Existing discriminant is a strict prefix of the new one.
                return Err(PrefixCollision { existing });
            }
            let bit = ((value >> i) & 1) as usize;
            match &probe.children[bit] {
                Some(child) => probe = child,
                None => {
                    probe = &EMPTY;
                    break;
                }
            }
        }
        if let Some(existing) = probe.terminal {
            return Err(PrefixCollision { existing });
        }
        if probe.has_children() {
            // New discriminant would be a strict prefix of an existing one.
            return Err(PrefixCollision {
                existing: leftmost_terminal(probe),
            });
        }

        let mut node = &mut self.root;
        for i in (0..width).rev() {
            let bit = ((value >> i) & 1) as usize;
            node = node.children[bit].get_or_insert_with(Box::default);
        }
        node.terminal = Some(variant);
        self.len += 1;
        Ok(())
    }

    /// Resolve a discriminant by reading bits from `slice`, advancing it
    /// past exactly the discriminant that matched.
    ///
    /// Returns `Ok(None)` when no entry matches, including when the slice
    /// runs out of bits before reaching a terminal, which callers treat as
    /// an unrecognized discriminant. The slice is only advanced on a
    /// match.
    pub fn resolve(&self, slice: &mut CellSlice<'_>) -> Result<Option<(u16, u8)>, CellError> {
        let mut probe = slice.clone();
        let mut node = &self.root;
        let mut width = 0u8;
        loop {
            if let Some(variant) = node.terminal {
                slice.skip_bits(width as usize)?;
                return Ok(Some((variant, width)));
            }
            if probe.remaining_bits() == 0 {
                return Ok(None);
            }
            let bit = probe.load_bit()? as usize;
            match &node.children[bit] {
                Some(child) => {
                    node = child;
                    width += 1;
                }
                None => return Ok(None),
            }
        }
    }
}

static EMPTY: Node = Node {
    children: [None, None],
    terminal: None,
};

/// Any terminal under `node`; insertion guarantees at least one exists on
/// every populated subtree.
fn leftmost_terminal(node: &Node) -> u16 {
    if let Some(v) = node.terminal {
        return v;
    }
    for child in node.children.iter().flatten() {
        return leftmost_terminal(child);
    }
    debug_assert!(false, "trie subtree without terminal");
    0
}
