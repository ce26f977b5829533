//! Index interfaces, unions, group aliases, and namespace re-exports.

use std::fmt;

use indexmap::IndexMap;
use tl_schema::QualifiedName;

use crate::code_writer::CodeWriter;
use crate::cw_writeln;
use crate::Compilation;

/// `Types`, `Functions<T>`, and `Enums`: canonical name → binding type.
pub(crate) fn index_interfaces(
    w: &mut CodeWriter<&mut String>,
    compilation: &Compilation,
) -> fmt::Result {
    w.block("export interface Types", |w| {
        for shape in compilation.constructors() {
            cw_writeln!(w, "\"{}\": {};", shape.name.canonical(), shape.name.flat())?;
        }
        Ok(())
    })?;
    w.blank_line()?;

    w.block("export interface Functions<T = Function>", |w| {
        for shape in compilation.functions() {
            let type_args = if shape.is_generic { "<T>" } else { "" };
            cw_writeln!(
                w,
                "\"{}\": {}{type_args};",
                shape.name.canonical(),
                shape.name.flat()
            )?;
        }
        Ok(())
    })?;
    w.blank_line()?;

    w.block("export interface Enums", |w| {
        for group in compilation.groups.iter() {
            cw_writeln!(
                w,
                "\"{}\": {};",
                group.name,
                QualifiedName::parse(&group.name).flat()
            )?;
        }
        Ok(())
    })?;
    w.blank_line()?;
    Ok(())
}

pub(crate) fn unions(w: &mut CodeWriter<&mut String>, compilation: &Compilation) -> fmt::Result {
    w.writeln("export type AnyType = Types[keyof Types];")?;
    w.blank_line()?;
    w.writeln("export type AnyFunction<T = Function> = Functions<T>[keyof Functions<T>];")?;
    w.blank_line()?;

    let generic: Vec<String> = compilation
        .functions()
        .filter(|shape| shape.is_generic)
        .map(|shape| format!("{}<T>", shape.name.flat()))
        .collect();
    if !generic.is_empty() {
        cw_writeln!(
            w,
            "export type AnyGenericFunction<T> = {};",
            generic.join(" | ")
        )?;
        w.blank_line()?;
    }

    w.writeln("export type AnyObject<T = Function> = AnyType | AnyFunction<T>;")?;
    w.blank_line()?;
    Ok(())
}

/// One union alias per result-type group, in encounter order.
pub(crate) fn group_aliases(
    w: &mut CodeWriter<&mut String>,
    compilation: &Compilation,
) -> fmt::Result {
    for group in compilation.groups.iter() {
        let members: Vec<String> = group
            .members
            .iter()
            .map(|member| QualifiedName::parse(member).flat())
            .collect();
        cw_writeln!(
            w,
            "export type {} = {};",
            QualifiedName::parse(&group.name).flat(),
            members.join(" | ")
        )?;
        w.blank_line()?;
    }
    Ok(())
}

enum NamespaceEntry {
    /// A shape: both a type and its constructor procedure value.
    Shape { member: String, flat: String, generic: bool },
    /// A result-type group: type only.
    Group { member: String, flat: String },
}

/// Namespace re-export blocks.
///
/// Every qualified name already exists flat at the top level (the canonical
/// internal name); these blocks relocate it under its namespace. Both
/// renderings come from [`QualifiedName::flat`], so the alias is derived
/// mechanically and never re-derived.
pub(crate) fn namespaces(
    w: &mut CodeWriter<&mut String>,
    compilation: &Compilation,
) -> fmt::Result {
    let mut by_namespace: IndexMap<String, Vec<NamespaceEntry>> = IndexMap::new();

    for shape in compilation.constructors().chain(compilation.functions()) {
        if let Some(ns) = &shape.name.namespace {
            by_namespace.entry(ns.clone()).or_default().push(NamespaceEntry::Shape {
                member: shape.name.member.clone(),
                flat: shape.name.flat(),
                generic: shape.is_generic,
            });
        }
    }
    for group in compilation.groups.iter() {
        let name = QualifiedName::parse(&group.name);
        if let Some(ns) = &name.namespace {
            by_namespace.entry(ns.clone()).or_default().push(NamespaceEntry::Group {
                member: name.member.clone(),
                flat: name.flat(),
            });
        }
    }

    for (namespace, entries) in &by_namespace {
        w.block(&format!("export namespace {namespace}"), |w| {
            for entry in entries {
                match entry {
                    NamespaceEntry::Shape { member, flat, generic } => {
                        let type_params = if *generic { "<T>" } else { "" };
                        cw_writeln!(
                            w,
                            "export type {member}{type_params} = {flat}{type_params};"
                        )?;
                        cw_writeln!(w, "export const {member} = {flat};")?;
                    }
                    NamespaceEntry::Group { member, flat } => {
                        cw_writeln!(w, "export type {member} = {flat};")?;
                    }
                }
            }
            Ok(())
        })?;
        w.blank_line()?;
    }
    Ok(())
}
