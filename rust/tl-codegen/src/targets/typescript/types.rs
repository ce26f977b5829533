//! TypeScript type rendering and interface emission.
//!
//! The scalar table here is the binding-style contract: 64-bit and wider
//! integers land on `bigint`, never `number`.

use std::fmt;

use tl_schema::{GroupTable, QualifiedName, RefStyle, ResolvedField, ResolvedType, ScalarKind, Shape};

use crate::code_writer::CodeWriter;
use crate::cw_writeln;
use crate::Compilation;

/// TypeScript rendering of a resolved type.
pub(crate) fn ts_type(ty: &ResolvedType, groups: &GroupTable) -> String {
    match ty {
        ResolvedType::Scalar(kind) => ts_scalar_type(*kind).to_string(),
        ResolvedType::TypeParam => "T".into(),
        ResolvedType::TypeParamResult => "ReturnType<T>".into(),
        ResolvedType::Named { name, reference } => named_reference(name, *reference, groups),
        ResolvedType::Vector(element) => format!("Array<{}>", ts_type(element, groups)),
    }
}

/// Rendering for a function's return slot.
///
/// A declared result type whose group has exactly one member collapses to
/// that concrete shape; this changes nothing on the wire, only the
/// ergonomics of the generated type.
pub(crate) fn ts_return_type(ty: &ResolvedType, groups: &GroupTable) -> String {
    if let ResolvedType::Named { name, .. } = ty {
        if let Some(member) = groups.sole_member(&name.canonical()) {
            return QualifiedName::parse(member).flat();
        }
    }
    ts_type(ty, groups)
}

fn named_reference(name: &QualifiedName, reference: RefStyle, groups: &GroupTable) -> String {
    if reference == RefStyle::Concrete {
        // A pinned reference only works out when the group pins a single
        // constructor; otherwise fall back to the abstract name.
        if let Some(member) = groups.sole_member(&name.canonical()) {
            return QualifiedName::parse(member).flat();
        }
    }
    name.flat()
}

pub(crate) fn ts_scalar_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Int => "number",
        ScalarKind::Long => "bigint",
        ScalarKind::Bool => "boolean",
        ScalarKind::Double => "number",
        ScalarKind::True => "true",
        ScalarKind::String => "string",
        ScalarKind::Bytes => "Uint8Array",
        ScalarKind::Int128 => "bigint",
        ScalarKind::Int256 => "bigint",
    }
}

/// One field declaration, `?`-marked when flag-gated.
pub(crate) fn field_decl(field: &ResolvedField, groups: &GroupTable) -> String {
    let marker = if field.presence.is_optional() { "?" } else { "" };
    format!("{}{marker}: {}", field.name, ts_type(&field.ty, groups))
}

pub(crate) fn prelude(w: &mut CodeWriter<&mut String>) -> fmt::Result {
    w.writeln("// @generated by tl-codegen")?;
    w.writeln("// DO NOT EDIT - regenerate with `tlc --schema <schema.tl> --out <module.ts>`")?;
    w.blank_line()?;
    w.writeln("import type { Schema } from \"./0_types.ts\";")?;
    w.blank_line()?;
    w.writeln("declare const R: unique symbol;")?;
    w.blank_line()?;
    w.writeln("export type Function = { [R]?: unknown };")?;
    w.blank_line()?;
    w.writeln(
        "export type ReturnType<T> = T extends Function ? NonNullable<T[typeof R]> : never;",
    )?;
    w.blank_line()?;
    Ok(())
}

/// One interface per shape, constructors first, then functions.
pub(crate) fn interfaces(w: &mut CodeWriter<&mut String>, compilation: &Compilation) -> fmt::Result {
    for shape in compilation.constructors() {
        interface(w, shape, &compilation.groups)?;
        w.blank_line()?;
    }
    for shape in compilation.functions() {
        interface(w, shape, &compilation.groups)?;
        w.blank_line()?;
    }
    Ok(())
}

fn interface(w: &mut CodeWriter<&mut String>, shape: &Shape, groups: &GroupTable) -> fmt::Result {
    let type_params = if shape.is_generic { "<T>" } else { "" };
    let header = format!("export interface {}{type_params}", shape.name.flat());
    w.block(&header, |w| {
        cw_writeln!(w, "_: \"{}\";", shape.name.canonical())?;
        for field in &shape.fields {
            cw_writeln!(w, "{};", field_decl(field, groups))?;
        }
        if let Some(return_type) = &shape.return_type {
            cw_writeln!(w, "[R]?: {};", ts_return_type(return_type, groups))?;
        }
        Ok(())
    })
}
