#![deny(unsafe_code)]

//! Core TL schema compilation.
//!
//! # This Is Where Binding Generation Actually Happens
//!
//! While `tl-parse` turns schema text into raw definitions, this crate
//! consumes them and produces everything a target needs:
//!
//! - **Type resolution** — wire-type grammar → resolved types ([`resolve`])
//! - **Shape building** — per-definition field lists, optional-field gates,
//!   declared-shape descriptors ([`build_shape`])
//! - **Sum-type grouping** — constructors by declared result type
//!   ([`collect_groups`])
//! - **Registries** — tag → shape and name → shape dispatch tables
//!   ([`build_registry`])
//! - **Emission** — the TypeScript module ([`targets::typescript`])
//!
//! # The Pipeline
//!
//! ```text
//! schema text   →   tl-parse   →   compile()   →   targets::typescript
//!   (.tl file)      (RawDefinition)  (Compilation)    (.ts module text)
//! ```
//!
//! Compilation is a pure, deterministic function of its input: one pass,
//! value-threaded accumulators, insertion-ordered tables. Compiling the same
//! schema twice yields byte-identical output. Any failure surfaces
//! immediately; there is no partial result.
//!
//! # Example
//!
//! ```
//! let schema = tl_parse::parse_schema("msg#abcdef01 text:string = Message;").unwrap();
//! let compilation = tl_codegen::compile(&schema).unwrap();
//! let module = tl_codegen::targets::typescript::generate(&compilation);
//! assert!(module.contains("export interface msg"));
//! ```

pub mod code_writer;
mod group;
mod layer;
mod registry;
mod render;
mod resolve;
mod shape;
pub mod targets;

pub use group::collect_groups;
pub use layer::patch_layer;
pub use registry::build_registry;
pub use resolve::{resolve, resolve_descriptor, ResolveError};
pub use shape::build_shape;

use std::fmt;

use tl_parse::SchemaFile;
use tl_schema::{DefinitionKind, GroupTable, Registry, Shape, Tag};
use tracing::debug;

/// Everything one schema compiles to, prior to rendering.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Shapes in schema encounter order, denylisted tags excluded.
    pub shapes: Vec<Shape>,
    pub groups: GroupTable,
    pub registry: Registry,
    /// The schema's `// LAYER <n>` marker, if present.
    pub layer: Option<u32>,
}

impl Compilation {
    /// Constructor shapes in encounter order.
    pub fn constructors(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| shape.kind == DefinitionKind::Constructor)
    }

    /// Function shapes in encounter order.
    pub fn functions(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| shape.kind == DefinitionKind::Function)
    }

    /// Decode dispatch: the constructor carrying this tag.
    pub fn shape_by_tag(&self, tag: Tag) -> Option<&Shape> {
        self.registry
            .index_by_tag(tag)
            .and_then(|index| self.shapes.get(index))
    }

    /// Programmatic lookup by canonical schema name.
    pub fn shape_by_name(&self, name: &str) -> Option<&Shape> {
        self.registry
            .index_by_name(name)
            .and_then(|index| self.shapes.get(index))
    }
}

/// Why a compilation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A wire-type token that resolution rejects, with the offending
    /// definition identified.
    Unresolved {
        definition: String,
        param: Option<String>,
        token: String,
        reason: String,
    },
    /// Two non-denylisted constructors carrying the same tag.
    DuplicateTag { definition: String, tag: Tag },
    /// Two definitions carrying the same canonical name.
    DuplicateName { definition: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Unresolved {
                definition,
                param,
                token,
                reason,
            } => {
                write!(f, "cannot resolve `{token}` in `{definition}`")?;
                if let Some(param) = param {
                    write!(f, " (param `{param}`)")?;
                }
                write!(f, ": {reason}")
            }
            CompileError::DuplicateTag { definition, tag } => {
                write!(f, "duplicate tag {tag} on `{definition}`")
            }
            CompileError::DuplicateName { definition } => {
                write!(f, "duplicate definition name `{definition}`")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Compile a parsed schema: shapes, groups, registries, layer.
///
/// Definitions carrying a denylisted tag are skipped entirely; everything
/// else either fully resolves or aborts the run.
pub fn compile(schema: &SchemaFile) -> Result<Compilation, CompileError> {
    let mut shapes = Vec::with_capacity(schema.definitions.len());
    for def in &schema.definitions {
        if def.tag.is_skipped() {
            continue;
        }
        shapes.push(build_shape(def)?);
    }

    let groups = collect_groups(&shapes);
    let registry = build_registry(&shapes)?;
    debug!(
        shapes = shapes.len(),
        groups = groups.len(),
        layer = ?schema.layer,
        "compiled schema"
    );

    Ok(Compilation {
        shapes,
        groups,
        registry,
        layer: schema.layer,
    })
}
