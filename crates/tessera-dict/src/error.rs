//! Dictionary errors.

use tessera_cell::CellError;

/// Dictionary operation failure.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    /// The key does not fit the dictionary's key width.
    #[error("key {key} out of range for {key_bits}-bit keys")]
    KeyOutOfRange { key: i128, key_bits: u16 },

    /// A node cell does not follow the trie format.
    #[error("malformed dictionary node: {reason}")]
    Malformed { reason: String },

    /// A rebuilt node does not fit the cell limits.
    #[error("dictionary node exceeds cell size")]
    NodeOverflow { source: CellError },
}

/// A node read failed at the cell level, so the node is malformed.
pub(crate) fn malformed_read(err: CellError) -> DictError {
    DictError::Malformed {
        reason: err.to_string(),
    }
}

pub(crate) fn overflow(err: CellError) -> DictError {
    DictError::NodeOverflow { source: err }
}
