//! Union dispatch: discriminant resolution and match evaluation.

use tessera_cell::{Cell, CellSlice};
use tessera_layout::{FallbackPolicy, LayoutRegistry, TypeId, UnionLayout};

use crate::error::{CodecError, read_context};
use crate::lazy::LazyRecord;
use crate::value::Value;

/// A lazily-opened union value: resolved variant plus a lazy view over
/// the variant record's fields, cursor already past the discriminant.
///
/// The view borrows the cell; copy field values out if they must outlive
/// the dispatch scope.
#[derive(Debug)]
pub struct UnionView<'c, 'r> {
    union: &'r UnionLayout,
    variant: usize,
    fields: LazyRecord<'c, 'r>,
}

impl<'c, 'r> UnionView<'c, 'r> {
    /// Index of the resolved variant within the union declaration.
    pub fn variant_index(&self) -> usize {
        self.variant
    }

    /// Name of the resolved variant's record type.
    pub fn variant_name(&self) -> &'r str {
        &self.union.variants[self.variant].name
    }

    /// Lazy access to the variant's fields.
    pub fn fields(&mut self) -> &mut LazyRecord<'c, 'r> {
        &mut self.fields
    }

    /// Shorthand for `fields().field_by_name(name)`.
    pub fn field(&mut self, name: &str) -> Result<&Value, CodecError> {
        self.fields.field_by_name(name)
    }
}

/// Open `cell` as a lazy value of union type `ty`.
///
/// Reads exactly the bits the discriminant trie needs: if the first
/// variant's width already disambiguates, no more is consumed. Unknown
/// discriminants fail with [`CodecError::UnmatchedVariant`]; callers
/// wanting a fallback arm use [`UnionMatch`].
pub fn open_lazy_union<'c, 'r>(
    registry: &'r LayoutRegistry,
    cell: &'c Cell,
    ty: TypeId,
) -> Result<UnionView<'c, 'r>, CodecError> {
    let union = registry.union_of(ty)?;
    let mut slice = CellSlice::new(cell);
    let resolved = union
        .trie
        .resolve(&mut slice)
        .map_err(|e| read_context(&union.name, "<discriminant>", e))?;
    let Some((variant_index, _width)) = resolved else {
        return Err(CodecError::UnmatchedVariant {
            union: union.name.clone(),
        });
    };
    let variant = variant_index as usize;
    let record = registry.record_of(union.variants[variant].type_id)?;
    Ok(UnionView {
        union,
        variant,
        fields: LazyRecord::from_parts(registry, record, slice),
    })
}

type ArmHandler<'h, 'c, 'r, R> =
    Box<dyn FnOnce(&mut UnionView<'c, 'r>) -> Result<R, CodecError> + 'h>;
type FallbackHandler<'h, 'c, R> = Box<dyn FnOnce(CellSlice<'c>) -> Result<R, CodecError> + 'h>;

/// Match evaluation over a lazily-opened union.
///
/// Exactly one handler runs: the arm of the resolved variant, or the
/// fallback. The fallback covers both unknown discriminants (when the
/// union was registered with [`FallbackPolicy::Fallback`]) and resolved
/// variants the arm list does not name; it receives an untouched slice
/// over the whole cell. Exhaustiveness is not enforced here; that is
/// the front end's job.
///
/// ```
/// # use tessera_layout::{FieldDef, FieldType, FallbackPolicy, LayoutRegistry, Opcode};
/// # use tessera_codec::{Encoder, UnionMatch, Value};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut reg = LayoutRegistry::new();
/// # let ping = reg.register_record("Ping", Some(Opcode::new(1, 8)),
/// #     vec![FieldDef::new("seq", FieldType::Uint { bits: 32 })])?;
/// # let frame = reg.register_union("Frame", &[ping], FallbackPolicy::Reject)?;
/// # let cell = Encoder::new(&reg).encode(frame, &Value::variant(0, [Value::Uint(9)]))?;
/// let seq = UnionMatch::over(&reg, &cell, frame)
///     .arm("Ping", |view| Ok(view.field("seq")?.as_uint().unwrap()))
///     .run()?;
/// assert_eq!(seq, 9);
/// # Ok(())
/// # }
/// ```
pub struct UnionMatch<'h, 'c, 'r, R> {
    registry: &'r LayoutRegistry,
    cell: &'c Cell,
    ty: TypeId,
    arms: Vec<(String, ArmHandler<'h, 'c, 'r, R>)>,
    fallback: Option<FallbackHandler<'h, 'c, R>>,
}

impl<'h, 'c, 'r, R> UnionMatch<'h, 'c, 'r, R> {
    /// Start a match over `cell` as union `ty`.
    pub fn over(registry: &'r LayoutRegistry, cell: &'c Cell, ty: TypeId) -> Self {
        Self {
            registry,
            cell,
            ty,
            arms: Vec::new(),
            fallback: None,
        }
    }

    /// Add a handler for one variant, by record type name.
    pub fn arm(
        mut self,
        variant: &str,
        handler: impl FnOnce(&mut UnionView<'c, 'r>) -> Result<R, CodecError> + 'h,
    ) -> Self {
        self.arms.push((variant.to_owned(), Box::new(handler)));
        self
    }

    /// Add the `else` arm. It receives a fresh slice over the whole
    /// cell, discriminant included.
    pub fn fallback(
        mut self,
        handler: impl FnOnce(CellSlice<'c>) -> Result<R, CodecError> + 'h,
    ) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Resolve the discriminant and invoke exactly one handler.
    pub fn run(mut self) -> Result<R, CodecError> {
        let union = self.registry.union_of(self.ty)?;

        // Reject arms naming variants the union does not declare; a typo
        // here would otherwise silently shadow the fallback.
        for (name, _) in &self.arms {
            if union.variant_index(name).is_none() {
                return Err(CodecError::UnknownArm {
                    union: union.name.clone(),
                    variant: name.clone(),
                });
            }
        }

        let mut slice = CellSlice::new(self.cell);
        let resolved = union
            .trie
            .resolve(&mut slice)
            .map_err(|e| read_context(&union.name, "<discriminant>", e))?;

        match resolved {
            Some((variant_index, _width)) => {
                let variant = variant_index as usize;
                let name = &union.variants[variant].name;
                if let Some(pos) = self.arms.iter().position(|(n, _)| n == name) {
                    let (_, handler) = self.arms.swap_remove(pos);
                    let record = self
                        .registry
                        .record_of(union.variants[variant].type_id)?;
                    let mut view = UnionView {
                        union,
                        variant,
                        fields: LazyRecord::from_parts(self.registry, record, slice),
                    };
                    handler(&mut view)
                } else if let Some(fallback) = self.fallback {
                    fallback(CellSlice::new(self.cell))
                } else {
                    Err(CodecError::UnmatchedVariant {
                        union: union.name.clone(),
                    })
                }
            }
            None => {
                // Unknown discriminant: recoverable only if the union
                // declared a fallback policy and the caller supplied the
                // arm.
                if union.fallback == FallbackPolicy::Fallback {
                    if let Some(fallback) = self.fallback {
                        return fallback(CellSlice::new(self.cell));
                    }
                }
                Err(CodecError::UnmatchedVariant {
                    union: union.name.clone(),
                })
            }
        }
    }
}
