//! Owned bit sequences with MSB-first packing.
//!
//! Cell payloads are bit sequences, not byte sequences: a cell may hold
//! 33 bits. `BitString` stores bits packed into bytes, most significant
//! bit first, with an explicit bit length. Lexicographic bit order equals
//! unsigned integer order for equal-width strings, which the dictionary's
//! ordered navigation relies on.

use std::fmt;

/// An owned sequence of bits.
///
/// Bits are packed MSB-first: bit 0 is the high bit of byte 0. Trailing
/// bits of the last byte beyond `len` are kept zero so that equal bit
/// strings compare equal on their byte representation.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the string holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the bit at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len()`.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        let byte = self.bytes[index / 8];
        (byte >> (7 - (index % 8))) & 1 == 1
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let i = self.len;
            self.bytes[i / 8] |= 1 << (7 - (i % 8));
        }
        self.len += 1;
    }

    /// Append the low `width` bits of `value`, most significant first.
    ///
    /// # Panics
    /// Panics if `width > 128` or if `value` does not fit in `width` bits.
    pub fn push_uint(&mut self, value: u128, width: u16) {
        assert!(width <= 128, "uint width {width} exceeds 128");
        if width < 128 {
            assert!(
                value < (1u128 << width),
                "value {value} does not fit in {width} bits"
            );
        }
        for i in (0..width).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    /// Append `value` as a `width`-bit two's complement integer.
    ///
    /// # Panics
    /// Panics if `width` is 0, exceeds 128, or `value` is out of range.
    pub fn push_int(&mut self, value: i128, width: u16) {
        assert!(width > 0 && width <= 128, "int width {width} out of range");
        if width < 128 {
            let lo = -(1i128 << (width - 1));
            let hi = (1i128 << (width - 1)) - 1;
            assert!(
                value >= lo && value <= hi,
                "value {value} does not fit in {width} signed bits"
            );
        }
        for i in (0..width).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
    }

    /// Append all bits of `other`.
    pub fn append(&mut self, other: &BitString) {
        // Fast path: self is byte-aligned, bulk-copy other's bytes.
        if self.len % 8 == 0 {
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
            return;
        }
        for i in 0..other.len {
            self.push_bit(other.bit(i));
        }
    }

    /// Bits `[start, start + width)` interpreted as an unsigned integer.
    ///
    /// # Panics
    /// Panics if the range is out of bounds or `width > 128`.
    pub fn uint_at(&self, start: usize, width: u16) -> u128 {
        assert!(width <= 128, "uint width {width} exceeds 128");
        assert!(
            start + width as usize <= self.len,
            "bit range {start}..{} out of bounds {}",
            start + width as usize,
            self.len
        );
        let mut out = 0u128;
        for i in 0..width as usize {
            out = (out << 1) | (self.bit(start + i) as u128);
        }
        out
    }

    /// Copy bits `[start, start + count)` into a new bit string.
    pub fn substring(&self, start: usize, count: usize) -> BitString {
        assert!(start + count <= self.len, "substring out of bounds");
        let mut out = BitString::with_capacity(count);
        for i in 0..count {
            out.push_bit(self.bit(start + i));
        }
        out
    }

    /// Length of the longest common prefix with `other`.
    pub fn common_prefix_len(&self, other: &BitString) -> usize {
        let max = self.len.min(other.len);
        for i in 0..max {
            if self.bit(i) != other.bit(i) {
                return i;
            }
        }
        max
    }

    /// Iterate over all bits in order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.bit(i))
    }

    /// Build from an iterator of bits.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut out = BitString::new();
        for b in bits {
            out.push_bit(b);
        }
        out
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({self})")
    }
}

impl PartialOrd for BitString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BitString {
    /// Lexicographic bit order. For equal lengths this is unsigned
    /// integer order.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let max = self.len.min(other.len);
        for i in 0..max {
            match (self.bit(i), other.bit(i)) {
                (false, true) => return std::cmp::Ordering::Less,
                (true, false) => return std::cmp::Ordering::Greater,
                _ => {}
            }
        }
        self.len.cmp(&other.len)
    }
}
