#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Type layout registry for Tessera.
//!
//! A [`LayoutRegistry`] turns type declarations into canonical bit-level
//! layouts: field order, widths, presence bits, reference placement and
//! union discriminant tables. Layouts are computed once at registration,
//! validated there (ambiguous widths, colliding discriminants, shapes that
//! cannot fit a cell), and read-only afterwards. The codec and dictionary
//! crates consume layouts; they never re-derive them.
//!
//! Declarations arrive either programmatically (see [`FieldDef`] and
//! [`LayoutRegistry::register_record`]) or from a JSON schema document
//! (see [`schema::load_schema`]).

mod disc;
mod error;
mod field;
mod layout;
mod registry;

pub mod dump;
pub mod schema;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod schema_tests;

pub use disc::DiscriminantTrie;
pub use error::LayoutError;
pub use field::{FieldDef, FieldType, Shape};
pub use layout::{FallbackPolicy, Opcode, RecordLayout, TypeLayout, UnionLayout, UnionVariant};
pub use registry::{LayoutRegistry, TypeId};
