#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Bounded cell trees and bit-level cursors for Tessera.
//!
//! This crate contains the storage primitives everything else builds on:
//! - [`BitString`]: an owned, growable bit sequence with MSB-first packing
//! - [`Cell`]: an immutable tree node of bits plus child references
//! - [`CellBuilder`]: a consuming builder that enforces cell limits
//! - [`CellSlice`]: a non-owning read cursor over a cell's bits and refs

mod bits;
mod builder;
mod cell;
mod error;
mod slice;

#[cfg(test)]
mod builder_tests;

pub use bits::BitString;
pub use builder::CellBuilder;
pub use cell::{Cell, CellLimits};
pub use error::CellError;
pub use slice::CellSlice;
