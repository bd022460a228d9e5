#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Type-directed cell codec for Tessera.
//!
//! Three ways in and out of the wire format, all driven by a
//! [`LayoutRegistry`](tessera_layout::LayoutRegistry):
//! - [`Encoder`]: typed value → cell tree, deterministic bit-for-bit
//! - [`decode`] / [`decode_strict`]: cell tree → fully materialized value
//! - [`LazyRecord`] / [`open_lazy`]: cell tree → view that decodes fields
//!   on first access, skipping (without materializing) everything the
//!   caller never asks for
//!
//! Union values carry no tag of their own: the variant record's opcode
//! prefix is the discriminant. [`open_lazy_union`] and [`UnionMatch`]
//! resolve it by walking the union's prefix trie, reading only the bits
//! needed to disambiguate.

mod decode;
mod dispatch;
mod encode;
mod error;
mod lazy;
mod value;


pub use decode::{decode, decode_strict};
pub use dispatch::{UnionMatch, UnionView, open_lazy_union};
pub use encode::Encoder;
pub use error::CodecError;
pub use lazy::{LazyRecord, open_lazy};
pub use value::Value;
