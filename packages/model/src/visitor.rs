use crate::Node;

/// Where a visited node sits in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeContext {
    /// Absolute position of the node's start
    pub pos: usize,

    /// Content start of the parent (`0` for children of the root)
    pub parent: usize,

    /// Slot index among the parent's children
    pub index: usize,

    pub depth: usize,
}

/// Visitor pattern for traversing document trees
///
/// The default implementation walks the entire tree depth-first in document
/// order. Override `visit_node` to act on nodes; call [`walk_node`] to keep
/// descending.
pub trait Visitor<'a>: Sized {
    fn visit_node(&mut self, node: &'a Node, cx: NodeContext) {
        walk_node(self, node, cx);
    }
}

/// Visit every descendant of the root (the root itself is not visited)
pub fn walk_document<'a, V: Visitor<'a>>(visitor: &mut V, root: &'a Node) {
    walk_children(visitor, root, 0, 1);
}

pub fn walk_node<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Node, cx: NodeContext) {
    if node.is_leaf() {
        return;
    }
    walk_children(visitor, node, cx.pos + 1, cx.depth + 1);
}

fn walk_children<'a, V: Visitor<'a>>(visitor: &mut V, node: &'a Node, start: usize, depth: usize) {
    let mut offset = start;
    for (index, child) in node.content().iter().enumerate() {
        visitor.visit_node(
            child,
            NodeContext {
                pos: offset,
                parent: start,
                index,
                depth,
            },
        );
        offset += child.size();
    }
}
