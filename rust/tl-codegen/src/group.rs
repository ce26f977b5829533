//! Sum-type grouping.
//!
//! Constructors sharing a declared result type form a group; each group is
//! emitted as a named union, and function return types collapse through
//! singleton groups to the concrete member shape.

use tl_schema::{DefinitionKind, GroupTable, Shape};

/// Fold constructors into result-type groups, in encounter order.
///
/// Functions never contribute members; membership comes solely from the
/// declared result-type string.
pub fn collect_groups(shapes: &[Shape]) -> GroupTable {
    shapes
        .iter()
        .filter(|shape| shape.kind == DefinitionKind::Constructor)
        .fold(GroupTable::new(), |mut table, shape| {
            table.add_member(&shape.result_type, &shape.name.canonical());
            table
        })
}
