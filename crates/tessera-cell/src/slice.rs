//! Non-owning read cursor over a cell.

use std::sync::Arc;

use crate::cell::Cell;
use crate::{BitString, CellError};

/// A read cursor over a borrowed [`Cell`].
///
/// Tracks a bit position and a reference position independently. Loads
/// advance the cursor; peeks do not. The underlying cell is immutable, so
/// any number of slices may read it concurrently; cloning a slice forks
/// the cursor, not the data.
#[derive(Clone, Debug)]
pub struct CellSlice<'a> {
    cell: &'a Cell,
    bit_pos: usize,
    ref_pos: usize,
}

impl<'a> CellSlice<'a> {
    /// Cursor at the start of `cell`.
    pub fn new(cell: &'a Cell) -> Self {
        Self {
            cell,
            bit_pos: 0,
            ref_pos: 0,
        }
    }

    /// The cell this slice reads from.
    pub fn cell(&self) -> &'a Cell {
        self.cell
    }

    /// Current bit position.
    #[inline]
    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    /// Current reference position.
    #[inline]
    pub fn ref_pos(&self) -> usize {
        self.ref_pos
    }

    /// Rewind to an earlier position. Used to re-derive a field that was
    /// skipped past; never moves forward.
    ///
    /// # Panics
    /// Panics if the target position is ahead of the cursor.
    pub fn rewind_to(&mut self, bit_pos: usize, ref_pos: usize) {
        assert!(
            bit_pos <= self.bit_pos && ref_pos <= self.ref_pos,
            "rewind_to moving forward"
        );
        self.bit_pos = bit_pos;
        self.ref_pos = ref_pos;
    }

    /// Unread data bits.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.cell.bit_len() - self.bit_pos
    }

    /// Unread references.
    #[inline]
    pub fn remaining_refs(&self) -> usize {
        self.cell.ref_count() - self.ref_pos
    }

    /// Whether both bits and references are fully consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0 && self.remaining_refs() == 0
    }

    fn check_bits(&self, requested: usize) -> Result<(), CellError> {
        if requested > self.remaining_bits() {
            return Err(CellError::BitUnderflow {
                requested,
                available: self.remaining_bits(),
            });
        }
        Ok(())
    }

    /// Read one bit and advance.
    pub fn load_bit(&mut self) -> Result<bool, CellError> {
        self.check_bits(1)?;
        let bit = self.cell.bits().bit(self.bit_pos);
        self.bit_pos += 1;
        Ok(bit)
    }

    /// Read `width` bits as an unsigned integer and advance.
    pub fn load_uint(&mut self, width: u16) -> Result<u128, CellError> {
        self.check_bits(width as usize)?;
        let value = self.cell.bits().uint_at(self.bit_pos, width);
        self.bit_pos += width as usize;
        Ok(value)
    }

    /// Read `width` bits as a two's complement integer and advance.
    pub fn load_int(&mut self, width: u16) -> Result<i128, CellError> {
        debug_assert!(width > 0, "zero-width int load");
        let raw = self.load_uint(width)?;
        // Sign-extend from `width` bits.
        let shift = 128 - width as u32;
        Ok(((raw as i128) << shift) >> shift)
    }

    /// Read `width` bits as an unsigned integer without advancing.
    pub fn peek_uint(&self, width: u16) -> Result<u128, CellError> {
        self.check_bits(width as usize)?;
        Ok(self.cell.bits().uint_at(self.bit_pos, width))
    }

    /// Read `count` bits into an owned bit string and advance.
    pub fn load_bits(&mut self, count: usize) -> Result<BitString, CellError> {
        self.check_bits(count)?;
        let out = self.cell.bits().substring(self.bit_pos, count);
        self.bit_pos += count;
        Ok(out)
    }

    /// Advance past `count` bits without reading them.
    pub fn skip_bits(&mut self, count: usize) -> Result<(), CellError> {
        self.check_bits(count)?;
        self.bit_pos += count;
        Ok(())
    }

    /// Read the next reference and advance.
    pub fn load_ref(&mut self) -> Result<&'a Arc<Cell>, CellError> {
        match self.cell.reference(self.ref_pos) {
            Some(r) => {
                self.ref_pos += 1;
                Ok(r)
            }
            None => Err(CellError::RefUnderflow {
                loaded: self.ref_pos as u8,
            }),
        }
    }

    /// Advance past `count` references without reading them.
    pub fn skip_refs(&mut self, count: usize) -> Result<(), CellError> {
        if count > self.remaining_refs() {
            return Err(CellError::RefUnderflow {
                loaded: self.ref_pos as u8,
            });
        }
        self.ref_pos += count;
        Ok(())
    }

    /// Drain all remaining bits and references.
    pub fn load_remainder(&mut self) -> (BitString, Vec<Arc<Cell>>) {
        let bits = self
            .cell
            .bits()
            .substring(self.bit_pos, self.remaining_bits());
        self.bit_pos = self.cell.bit_len();
        let mut refs = Vec::with_capacity(self.remaining_refs());
        while let Some(r) = self.cell.reference(self.ref_pos) {
            refs.push(Arc::clone(r));
            self.ref_pos += 1;
        }
        (bits, refs)
    }
}
