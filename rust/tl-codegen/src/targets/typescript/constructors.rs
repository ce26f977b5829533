//! Constructor procedures.
//!
//! Every shape gets an `export function` that takes an aggregate of its
//! non-bitmask fields and stores each one into the returned instance. When
//! every field is optional (or there are none), the aggregate itself is
//! optional: the call contract changes, the wire layout does not.

use std::fmt;

use tl_schema::{GroupTable, Shape};

use crate::code_writer::CodeWriter;
use crate::cw_writeln;
use crate::Compilation;

use super::types::field_decl;

pub(crate) fn procedures(
    w: &mut CodeWriter<&mut String>,
    compilation: &Compilation,
) -> fmt::Result {
    for shape in compilation.constructors() {
        procedure(w, shape, &compilation.groups)?;
        w.blank_line()?;
    }
    for shape in compilation.functions() {
        procedure(w, shape, &compilation.groups)?;
        w.blank_line()?;
    }
    Ok(())
}

fn procedure(w: &mut CodeWriter<&mut String>, shape: &Shape, groups: &GroupTable) -> fmt::Result {
    let flat = shape.name.flat();
    let type_params = if shape.is_generic { "<T>" } else { "" };
    let aggregate_marker = if shape.all_optional { "?" } else { "" };

    if shape.fields.is_empty() {
        cw_writeln!(
            w,
            "export function {flat}{type_params}(params{aggregate_marker}: Record<never, never>): {flat}{type_params} {{"
        )?;
        {
            let _indent = w.indent();
            cw_writeln!(w, "return {{ _: \"{}\" }};", shape.name.canonical())?;
        }
        w.writeln("}")?;
        return Ok(());
    }

    cw_writeln!(w, "export function {flat}{type_params}(params{aggregate_marker}: {{")?;
    {
        let _indent = w.indent();
        for field in &shape.fields {
            cw_writeln!(w, "{};", field_decl(field, groups))?;
        }
    }
    cw_writeln!(w, "}}): {flat}{type_params} {{")?;
    {
        let _indent = w.indent();
        w.writeln("return {")?;
        {
            let _indent = w.indent();
            cw_writeln!(w, "_: \"{}\",", shape.name.canonical())?;
            let access = if shape.all_optional { "params?." } else { "params." };
            for field in &shape.fields {
                cw_writeln!(w, "{}: {access}{},", field.name, field.name)?;
            }
        }
        w.writeln("};")?;
    }
    w.writeln("}")?;
    Ok(())
}
