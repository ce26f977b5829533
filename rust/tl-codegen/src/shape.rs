//! Shape derivation.
//!
//! Turns one [`RawDefinition`] into the [`Shape`] every emitter pass
//! consumes: the ordered field list with bitmask declarations dropped, the
//! optional-field subset with its gating bits, the declared-shape descriptor
//! over all params, and (for functions) the resolved return type.
//!
//! There is no partial shape: the first unresolvable param aborts the whole
//! generation run with the offending definition identified.

use tl_schema::{
    DefinitionKind, DescriptorEntry, Presence, RawDefinition, RefStyle, ResolvedField,
    ResolvedType, Shape, TypeExpr,
};

use crate::resolve::{resolve, resolve_descriptor, ResolveError};
use crate::CompileError;

/// Build the shape for one definition.
pub fn build_shape(def: &RawDefinition) -> Result<Shape, CompileError> {
    let mut fields = Vec::with_capacity(def.params.len());
    let mut descriptor = Vec::with_capacity(def.params.len());

    for param in &def.params {
        let is_bitmask = param.ty.is_bitmask_marker();
        if is_bitmask && !param.name.starts_with("flags") {
            return Err(unresolved(def, Some(&param.name), &param.raw_type, ResolveError::StrayBitmask));
        }

        let descriptor_ty = resolve_descriptor(&param.ty, RefStyle::Abstract)
            .map_err(|e| unresolved(def, Some(&param.name), &param.raw_type, e))?;
        descriptor.push(DescriptorEntry {
            name: param.name.clone(),
            ty: descriptor_ty,
            raw: param.raw_type.clone(),
        });

        // The bitmask declaration is a bit source, not an emitted field.
        if is_bitmask {
            continue;
        }

        let ty = resolve(&param.ty, RefStyle::Abstract)
            .map_err(|e| unresolved(def, Some(&param.name), &param.raw_type, e))?;
        let presence = match &param.ty {
            TypeExpr::Flagged { field, bit, .. } => Presence::Flagged {
                field: field.clone(),
                bit: *bit,
            },
            _ => Presence::Required,
        };
        fields.push(ResolvedField {
            name: param.name.clone(),
            ty,
            presence,
        });
    }

    let all_optional = fields.iter().all(|f| f.presence.is_optional());
    let return_type = match def.kind {
        DefinitionKind::Function => Some(resolve_return(def)?),
        DefinitionKind::Constructor => None,
    };

    Ok(Shape {
        tag: def.tag,
        kind: def.kind,
        name: def.name.clone(),
        result_type: def.result_type.clone(),
        is_generic: def.is_generic(),
        all_optional,
        fields,
        descriptor,
        return_type,
    })
}

fn resolve_return(def: &RawDefinition) -> Result<ResolvedType, CompileError> {
    let expr = tl_parse::parse_type_expr(&def.result_type).map_err(|e| {
        CompileError::Unresolved {
            definition: def.name.canonical(),
            param: None,
            token: def.result_type.clone(),
            reason: e.to_string(),
        }
    })?;
    resolve(&expr, RefStyle::Abstract).map_err(|e| {
        unresolved(def, None, &def.result_type, e)
    })
}

fn unresolved(
    def: &RawDefinition,
    param: Option<&str>,
    token: &str,
    error: ResolveError,
) -> CompileError {
    CompileError::Unresolved {
        definition: def.name.canonical(),
        param: param.map(str::to_string),
        token: token.to_string(),
        reason: error.to_string(),
    }
}
