//! TypeScript binding emission.
//!
//! One schema compiles to one self-contained module:
//!
//! 1. a prelude declaring the return-slot symbol and `Function` /
//!    `ReturnType<T>` helpers,
//! 2. an interface per shape (discriminated by the canonical name, fields in
//!    schema order, optionals `?`-marked),
//! 3. a constructor procedure per shape,
//! 4. the `Types` / `Functions` / `Enums` index interfaces and the
//!    `AnyType` / `AnyFunction` / `AnyObject` unions,
//! 5. a union alias per result-type group,
//! 6. namespace re-export blocks for qualified names,
//! 7. the runtime schema constant (declared-shape descriptors and the
//!    tag → name registry) and the instance-value helper.
//!
//! Every section iterates in insertion order; generating twice from the same
//! compilation yields byte-identical text.

mod constructors;
mod indexes;
mod schema;
mod types;

use std::fmt;

use crate::code_writer::CodeWriter;
use crate::Compilation;

/// Generate the complete TypeScript module for a compilation.
pub fn generate(compilation: &Compilation) -> String {
    let mut out = String::new();
    {
        let mut w = CodeWriter::with_indent_spaces(&mut out, 2);
        render_module(&mut w, compilation).expect("formatting into a String cannot fail");
    }
    let mut text = out.trim_end().to_string();
    text.push('\n');
    text
}

fn render_module(w: &mut CodeWriter<&mut String>, compilation: &Compilation) -> fmt::Result {
    types::prelude(w)?;
    types::interfaces(w, compilation)?;
    constructors::procedures(w, compilation)?;
    indexes::index_interfaces(w, compilation)?;
    indexes::unions(w, compilation)?;
    indexes::group_aliases(w, compilation)?;
    indexes::namespaces(w, compilation)?;
    schema::schema_const(w, compilation)?;
    schema::instance_values(w)?;
    Ok(())
}
