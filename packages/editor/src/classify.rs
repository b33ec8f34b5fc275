//! Node classification predicates.
//!
//! Unknown kinds deserialize to [`NodeKind::Other`] and answer `false` to
//! every predicate here, which keeps them out of all invariant checks.

use cellguard_model::{Node, NodeKind};

pub fn classify(node: &Node) -> NodeKind {
    node.kind()
}

pub fn is_table(node: &Node) -> bool {
    node.kind() == NodeKind::Table
}

pub fn is_row(node: &Node) -> bool {
    node.kind() == NodeKind::Row
}

pub fn is_header_cell(node: &Node) -> bool {
    node.kind() == NodeKind::HeaderCell
}

/// Non-header cell
pub fn is_cell(node: &Node) -> bool {
    node.kind() == NodeKind::Cell
}

/// Header or non-header cell
pub fn is_any_cell(node: &Node) -> bool {
    is_cell_kind(node.kind())
}

pub fn is_cell_kind(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Cell | NodeKind::HeaderCell)
}

pub fn is_empty_paragraph(node: &Node) -> bool {
    node.kind() == NodeKind::Paragraph && node.content_size() == 0
}

pub fn is_protected_separator(node: &Node) -> bool {
    node.kind() == NodeKind::Paragraph && node.is_unremovable()
}
