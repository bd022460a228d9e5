//! Human-readable registry dump for debugging and snapshot tests.

use std::fmt::Write as _;

use crate::field::Shape;
use crate::layout::TypeLayout;
use crate::registry::LayoutRegistry;

/// Render every registered layout as stable text.
pub fn dump(registry: &LayoutRegistry) -> String {
    let limits = registry.limits();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "registry: {} types, limits {} bits / {} refs",
        registry.len(),
        limits.max_bits,
        limits.max_refs
    );

    for layout in registry.iter() {
        out.push('\n');
        match layout {
            TypeLayout::Record(r) => {
                let _ = writeln!(out, "{} record {}", r.type_id, r.name);
                match r.opcode {
                    Some(op) => {
                        let _ = writeln!(out, "  opcode: {:#x}/{}", op.value, op.width);
                    }
                    None => {
                        let _ = writeln!(out, "  opcode: none");
                    }
                }
                for (i, field) in r.fields.iter().enumerate() {
                    let nullable = if field.nullable { "?" } else { "" };
                    let _ = writeln!(
                        out,
                        "  field {i}: {} {}{nullable}",
                        field.name,
                        field.ty.describe()
                    );
                }
                write_shape(&mut out, r.shape);
            }
            TypeLayout::Union(u) => {
                let _ = writeln!(out, "{} union {}", u.type_id, u.name);
                let _ = writeln!(out, "  fallback: {:?}", u.fallback);
                for (i, v) in u.variants.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  variant {i}: {} = {:#x}/{}",
                        v.name, v.discriminant, v.width
                    );
                }
                write_shape(&mut out, u.shape);
            }
        }
    }
    out
}

fn write_shape(out: &mut String, shape: Shape) {
    let max_bits = match shape.max_bits {
        Some(b) => b.to_string(),
        None => "*".to_string(),
    };
    let _ = writeln!(
        out,
        "  shape: bits {}..{max_bits}, refs {}..{}",
        shape.min_bits, shape.min_refs, shape.max_refs
    );
}
