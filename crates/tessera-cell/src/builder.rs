//! Consuming cell builder.

use std::sync::Arc;

use crate::cell::{Cell, CellLimits};
use crate::slice::CellSlice;
use crate::{BitString, CellError};

/// Builds an immutable [`Cell`], enforcing its limits at every store.
///
/// Every `store_*` consumes the builder and returns it, so construction
/// reads as a chain and a failed store cannot leave a half-written builder
/// behind:
///
/// ```
/// use tessera_cell::CellBuilder;
///
/// let cell = CellBuilder::new()
///     .store_uint(7, 32)?
///     .store_bit(true)?
///     .finish();
/// assert_eq!(cell.bit_len(), 33);
/// # Ok::<(), tessera_cell::CellError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CellBuilder {
    limits: CellLimits,
    bits: BitString,
    refs: Vec<Arc<Cell>>,
}

impl Default for CellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CellBuilder {
    /// Builder with the canonical limits profile.
    pub fn new() -> Self {
        Self::with_limits(CellLimits::default())
    }

    /// Builder with explicit limits.
    pub fn with_limits(limits: CellLimits) -> Self {
        Self {
            limits,
            bits: BitString::new(),
            refs: Vec::new(),
        }
    }

    /// The limits this builder enforces.
    pub fn limits(&self) -> CellLimits {
        self.limits
    }

    /// Data bits stored so far.
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// References stored so far.
    pub fn ref_count(&self) -> usize {
        self.refs.len()
    }

    /// Data bits still available.
    pub fn spare_bits(&self) -> usize {
        self.limits.max_bits as usize - self.bits.len()
    }

    /// Reference slots still available.
    pub fn spare_refs(&self) -> usize {
        self.limits.max_refs as usize - self.refs.len()
    }

    fn check_bits(&self, extra: usize) -> Result<(), CellError> {
        let requested = self.bits.len() + extra;
        if requested > self.limits.max_bits as usize {
            return Err(CellError::BitOverflow {
                capacity: self.limits.max_bits,
                requested,
            });
        }
        Ok(())
    }

    fn check_refs(&self, extra: usize) -> Result<(), CellError> {
        if self.refs.len() + extra > self.limits.max_refs as usize {
            return Err(CellError::RefOverflow {
                capacity: self.limits.max_refs,
            });
        }
        Ok(())
    }

    /// Store a single bit.
    pub fn store_bit(mut self, bit: bool) -> Result<Self, CellError> {
        self.check_bits(1)?;
        self.bits.push_bit(bit);
        Ok(self)
    }

    /// Store the low `width` bits of `value`, most significant first.
    pub fn store_uint(mut self, value: u128, width: u16) -> Result<Self, CellError> {
        self.check_bits(width as usize)?;
        self.bits.push_uint(value, width);
        Ok(self)
    }

    /// Store `value` as a `width`-bit two's complement integer.
    pub fn store_int(mut self, value: i128, width: u16) -> Result<Self, CellError> {
        self.check_bits(width as usize)?;
        self.bits.push_int(value, width);
        Ok(self)
    }

    /// Store a whole bit string.
    pub fn store_bits(mut self, bits: &BitString) -> Result<Self, CellError> {
        self.check_bits(bits.len())?;
        self.bits.append(bits);
        Ok(self)
    }

    /// Store a child reference.
    pub fn store_ref(mut self, cell: Arc<Cell>) -> Result<Self, CellError> {
        self.check_refs(1)?;
        self.refs.push(cell);
        Ok(self)
    }

    /// Store everything remaining in `slice`: its unread bits, then its
    /// unread references.
    pub fn store_slice(mut self, slice: &CellSlice<'_>) -> Result<Self, CellError> {
        self.check_bits(slice.remaining_bits())?;
        self.check_refs(slice.remaining_refs())?;
        let mut probe = slice.clone();
        while probe.remaining_bits() > 0 {
            // Infallible: remaining_bits said so.
            let bit = probe.load_bit().expect("probe within bounds");
            self.bits.push_bit(bit);
        }
        while probe.remaining_refs() > 0 {
            let r = probe.load_ref().expect("probe within bounds");
            self.refs.push(Arc::clone(r));
        }
        Ok(self)
    }

    /// Finalize into an immutable cell.
    pub fn finish(self) -> Cell {
        Cell::from_parts(self.bits, self.refs)
    }

    /// Finalize into a shared cell.
    pub fn finish_shared(self) -> Arc<Cell> {
        Arc::new(self.finish())
    }
}
