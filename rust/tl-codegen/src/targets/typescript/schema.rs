//! The runtime schema constant and the instance-value helper.
//!
//! `definitions` carries the declared-shape descriptor of every shape
//! (ordered `[name, resolvedType, rawWireType]` triples, bitmask entries
//! included), keyed by canonical name and carrying the tag in its canonical
//! hex form. `identifierToName` is the tag → constructor registry the
//! decoder dispatches on. The instance-value helper walks the declared
//! descriptor in the same order and pairs each field with the value's
//! current runtime field, defaulting absent optionals to an explicit `null`.

use std::fmt;

use tl_schema::{GroupTable, Shape};

use crate::code_writer::CodeWriter;
use crate::cw_writeln;
use crate::render::obj_key;
use crate::Compilation;

use super::types::ts_type;

pub(crate) fn schema_const(
    w: &mut CodeWriter<&mut String>,
    compilation: &Compilation,
) -> fmt::Result {
    w.writeln("export const schema = Object.freeze({")?;
    {
        let _indent = w.indent();
        w.writeln("definitions: {")?;
        {
            let _indent = w.indent();
            for shape in compilation.constructors() {
                definition_entry(w, shape, &compilation.groups)?;
            }
            for shape in compilation.functions() {
                definition_entry(w, shape, &compilation.groups)?;
            }
        }
        w.writeln("},")?;
        w.writeln("identifierToName: {")?;
        {
            let _indent = w.indent();
            for shape in compilation.constructors() {
                cw_writeln!(w, "[{}]: \"{}\",", shape.tag, shape.name.canonical())?;
            }
        }
        w.writeln("},")?;
    }
    w.writeln("}) as unknown as Schema;")?;
    w.blank_line()?;
    Ok(())
}

fn definition_entry(
    w: &mut CodeWriter<&mut String>,
    shape: &Shape,
    groups: &GroupTable,
) -> fmt::Result {
    cw_writeln!(w, "{}: [", obj_key(&shape.name.canonical()))?;
    {
        let _indent = w.indent();
        cw_writeln!(w, "{},", shape.tag)?;
        if shape.descriptor.is_empty() {
            w.writeln("[],")?;
        } else {
            w.writeln("[")?;
            {
                let _indent = w.indent();
                for entry in &shape.descriptor {
                    cw_writeln!(
                        w,
                        "[\"{}\", \"{}\", \"{}\"],",
                        entry.name,
                        ts_type(&entry.ty, groups),
                        entry.raw
                    )?;
                }
            }
            w.writeln("],")?;
        }
        cw_writeln!(w, "\"{}\",", shape.result_type)?;
    }
    w.writeln("],")?;
    Ok(())
}

pub(crate) fn instance_values(w: &mut CodeWriter<&mut String>) -> fmt::Result {
    w.writeln(
        "export function instanceValues(value: AnyObject<unknown>): Array<[string, string, unknown]> {",
    )?;
    {
        let _indent = w.indent();
        w.writeln("const definitions = schema.definitions as unknown as Record<")?;
        {
            let _indent = w.indent();
            w.writeln("string,")?;
            w.writeln("[number, Array<[string, string, string]>, string]")?;
        }
        w.writeln(">;")?;
        w.writeln("const definition = definitions[value._];")?;
        w.writeln("if (!definition) {")?;
        {
            let _indent = w.indent();
            w.writeln("throw new Error(`Cannot get values of unknown type: ${value._}`);")?;
        }
        w.writeln("}")?;
        w.writeln("return definition[1].map(([name, type]): [string, string, unknown] => [")?;
        {
            let _indent = w.indent();
            w.writeln("name,")?;
            w.writeln("type,")?;
            w.writeln("(value as unknown as Record<string, unknown>)[name] ?? null,")?;
        }
        w.writeln("]);")?;
    }
    w.writeln("}")?;
    Ok(())
}
