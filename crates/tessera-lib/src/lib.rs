#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Tessera: a type-directed codec over bounded cell trees.
//!
//! Data lives in [`Cell`]s, immutable nodes holding up to a fixed number
//! of data bits and child references. A [`LayoutRegistry`] maps type
//! declarations to exact bit layouts; the codec walks those layouts to
//! [`Encoder::encode`] typed values into cells and [`decode`] them back,
//! eagerly or field-by-field on demand. [`Dictionary`] stores ordered
//! integer-keyed maps inside the same cell format.
//!
//! # Example
//!
//! ```
//! use tessera_lib::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = LayoutRegistry::new();
//! let point = registry.register_record(
//!     "Point",
//!     None,
//!     vec![
//!         FieldDef::new("x", FieldType::Int { bits: 32 }),
//!         FieldDef::new("y", FieldType::Int { bits: 32 }),
//!     ],
//! )?;
//!
//! let value = Value::record([Value::Int(-3), Value::Int(4)]);
//! let cell = Encoder::new(&registry).encode(point, &value)?;
//! assert_eq!(cell.bit_len(), 64);
//! assert_eq!(decode(&registry, &cell, point)?, value);
//! # Ok(())
//! # }
//! ```
//!
//! [`Cell`]: tessera_cell::Cell

pub use tessera_cell::{BitString, Cell, CellBuilder, CellError, CellLimits, CellSlice};
pub use tessera_codec::{
    CodecError, Encoder, LazyRecord, UnionMatch, UnionView, Value, decode, decode_strict,
    open_lazy, open_lazy_union,
};
pub use tessera_dict::{DictError, Dictionary, KeyOrder, MapEntry};
pub use tessera_layout::{
    DiscriminantTrie, FallbackPolicy, FieldDef, FieldType, LayoutError, LayoutRegistry, Opcode,
    RecordLayout, Shape, TypeId, TypeLayout, UnionLayout, UnionVariant, dump, schema,
};

/// The usual imports for working with Tessera end to end.
pub mod prelude {
    pub use tessera_cell::{BitString, Cell, CellBuilder, CellLimits, CellSlice};
    pub use tessera_codec::{
        Encoder, UnionMatch, Value, decode, decode_strict, open_lazy, open_lazy_union,
    };
    pub use tessera_dict::{Dictionary, KeyOrder};
    pub use tessera_layout::{
        FallbackPolicy, FieldDef, FieldType, LayoutRegistry, Opcode, TypeId,
        schema::load_schema,
    };
}
