#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Persistent dictionaries stored in cell trees.
//!
//! A [`Dictionary`] maps fixed-width integer keys to [`Cell`] values
//! through a binary radix trie whose nodes are themselves cells, so a
//! whole map travels inside any structure that can hold one ref. Mutators
//! never touch the receiver: `set` and `remove` return a new dictionary
//! sharing every unchanged subtree with the old one.
//!
//! Keys order the trie bit-lexicographically. [`KeyOrder::Signed`] stores
//! keys with the sign bit flipped, so ordered navigation ([`Dictionary::next`],
//! [`Dictionary::prev`] and friends) follows numeric order either way.
//!
//! [`Cell`]: tessera_cell::Cell

mod dict;
mod error;
mod iter;
mod key;
mod node;

#[cfg(test)]
mod dict_tests;

pub use dict::{Dictionary, MapEntry};
pub use error::DictError;
pub use iter::Iter;
pub use key::KeyOrder;
