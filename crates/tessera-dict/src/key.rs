//! Key codec: fixed-width integer keys as order-preserving bit strings.

use tessera_cell::BitString;

use crate::error::DictError;

/// Numeric interpretation of dictionary keys.
///
/// The trie orders entries by their key bits lexicographically. Unsigned
/// keys already sort that way; signed keys are stored with the sign bit
/// flipped so that lexicographic order equals numeric order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOrder {
    Unsigned,
    Signed,
}

/// Map `key` to its `key_bits`-wide path through the trie.
pub(crate) fn encode_key(
    key: i128,
    key_bits: u16,
    order: KeyOrder,
) -> Result<BitString, DictError> {
    let out_of_range = || DictError::KeyOutOfRange { key, key_bits };
    let mapped = match order {
        KeyOrder::Unsigned => {
            if key < 0 || (key as u128) >> key_bits != 0 {
                return Err(out_of_range());
            }
            key as u128
        }
        KeyOrder::Signed => {
            let half = 1i128 << (key_bits - 1);
            if key < -half || key >= half {
                return Err(out_of_range());
            }
            let mask = (1u128 << key_bits) - 1;
            ((key as u128) & mask) ^ (1u128 << (key_bits - 1))
        }
    };
    let mut bits = BitString::with_capacity(key_bits as usize);
    bits.push_uint(mapped, key_bits);
    Ok(bits)
}

/// Recover the key from a full `key_bits`-wide path.
pub(crate) fn decode_key(bits: &BitString, key_bits: u16, order: KeyOrder) -> i128 {
    debug_assert_eq!(bits.len(), key_bits as usize);
    let raw = bits.uint_at(0, key_bits);
    match order {
        KeyOrder::Unsigned => raw as i128,
        KeyOrder::Signed => {
            let unflipped = raw ^ (1u128 << (key_bits - 1));
            let shift = 128 - key_bits as u32;
            // Sign-extend from key_bits.
            ((unflipped as i128) << shift) >> shift
        }
    }
}
