//! Runtime dispatch tables.

use tl_schema::{DefinitionKind, Registry, Shape};

use crate::CompileError;

/// Single fold over the shapes into the two dispatch tables.
///
/// Constructors enter `tag → shape` (decode dispatch); constructors and
/// functions enter `name → shape` (programmatic lookup). Denylisted tags
/// never reach this point. The schema is expected to contain no other
/// duplicates, so any duplicate is a hard error.
pub fn build_registry(shapes: &[Shape]) -> Result<Registry, CompileError> {
    let mut registry = Registry::new();
    for (index, shape) in shapes.iter().enumerate() {
        if shape.kind == DefinitionKind::Constructor && !registry.insert_tag(shape.tag, index) {
            return Err(CompileError::DuplicateTag {
                definition: shape.name.canonical(),
                tag: shape.tag,
            });
        }
        if !registry.insert_name(shape.name.canonical(), index) {
            return Err(CompileError::DuplicateName {
                definition: shape.name.canonical(),
            });
        }
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_shape;
    use tl_parse::parse_definition;
    use tl_schema::Tag;

    fn shape(line: &str, kind: DefinitionKind) -> Shape {
        build_shape(&parse_definition(line, kind).unwrap()).unwrap()
    }

    #[test]
    fn constructors_enter_both_tables() {
        let shapes = vec![
            shape("msg#abcdef01 text:string = Message;", DefinitionKind::Constructor),
            shape("ping#7abe77ec ping_id:long = Pong;", DefinitionKind::Function),
        ];
        let registry = build_registry(&shapes).unwrap();
        assert_eq!(registry.tag_count(), 1);
        assert_eq!(registry.name_count(), 2);
        assert_eq!(registry.index_by_tag(Tag(0xABCDEF01)), Some(0));
        assert_eq!(registry.index_by_name("ping"), Some(1));
        assert_eq!(registry.index_by_tag(Tag(0x7ABE77EC)), None);
    }

    #[test]
    fn duplicate_tag_is_a_hard_error() {
        let shapes = vec![
            shape("a#00000001 = A;", DefinitionKind::Constructor),
            shape("b#00000001 = B;", DefinitionKind::Constructor),
        ];
        let err = build_registry(&shapes).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateTag { .. }));
    }

    #[test]
    fn duplicate_name_is_a_hard_error() {
        let shapes = vec![
            shape("a#00000001 = A;", DefinitionKind::Constructor),
            shape("a#00000002 = A;", DefinitionKind::Constructor),
        ];
        let err = build_registry(&shapes).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateName { .. }));
    }
}
