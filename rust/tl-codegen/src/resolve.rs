//! Wire-type resolution.
//!
//! Maps the parsed wire-type grammar ([`TypeExpr`]) onto the resolved form
//! the emitter renders ([`ResolvedType`]). The caller states whether a named
//! reference should read abstractly (the sum type over the result type's
//! constructors) or concretely (one pinned shape); `%`-bare tokens force the
//! concrete reading regardless.
//!
//! The flag gate of `flags.N?T` is presence metadata, not part of the type:
//! it is stripped here and carried by the shape builder instead.

use std::fmt;

use tl_schema::{QualifiedName, RefStyle, ResolvedType, ScalarKind, TypeExpr};

/// Why a wire-type token failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The `#` bitmask declaration outside a bitmask position.
    StrayBitmask,
    /// A vector element that is itself a vector.
    NestedVector,
    /// A flag gate nested under a vector wrapper.
    NestedFlag,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::StrayBitmask => {
                write!(f, "`#` is only valid as a `flags`-named bitmask declaration")
            }
            ResolveError::NestedVector => write!(f, "vectors do not nest"),
            ResolveError::NestedFlag => write!(f, "flag gates do not apply inside vectors"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolve a parsed wire-type token.
pub fn resolve(expr: &TypeExpr, want: RefStyle) -> Result<ResolvedType, ResolveError> {
    match expr {
        // The gating prefix is metadata, not part of the type.
        TypeExpr::Flagged { inner, .. } => resolve(inner, want),
        TypeExpr::Vector(inner) => {
            let element = resolve_element(inner, want)?;
            Ok(ResolvedType::Vector(Box::new(element)))
        }
        TypeExpr::Scalar(kind) => Ok(ResolvedType::Scalar(*kind)),
        TypeExpr::GenericArg => Ok(ResolvedType::TypeParam),
        TypeExpr::GenericResult => Ok(ResolvedType::TypeParamResult),
        TypeExpr::Named {
            namespace,
            name,
            bare,
        } => Ok(named(namespace.clone(), name, *bare, want)),
        TypeExpr::BitmaskMarker => Err(ResolveError::StrayBitmask),
    }
}

/// Resolve for a descriptor row.
///
/// The bitmask declaration occupies a 32-bit integer on the wire, so it
/// resolves here (and only here) instead of erroring.
pub fn resolve_descriptor(expr: &TypeExpr, want: RefStyle) -> Result<ResolvedType, ResolveError> {
    match expr {
        TypeExpr::BitmaskMarker => Ok(ResolvedType::Scalar(ScalarKind::Int)),
        other => resolve(other, want),
    }
}

fn resolve_element(expr: &TypeExpr, want: RefStyle) -> Result<ResolvedType, ResolveError> {
    match expr {
        TypeExpr::Vector(_) => Err(ResolveError::NestedVector),
        TypeExpr::Flagged { .. } => Err(ResolveError::NestedFlag),
        TypeExpr::BitmaskMarker => Err(ResolveError::StrayBitmask),
        other => resolve(other, want),
    }
}

fn named(namespace: Option<String>, name: &str, bare: bool, want: RefStyle) -> ResolvedType {
    let reference = if bare { RefStyle::Concrete } else { want };
    ResolvedType::Named {
        name: QualifiedName {
            namespace,
            member: name.to_string(),
        },
        reference,
    }
}
