//! Resolved positions: which containers surround a flat document position.

use crate::{EditError, Node, NodeKind};

/// One container on the path from the root to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub kind: NodeKind,

    /// Position where this container's content starts
    pub start: usize,

    /// Index of the child at (or containing) the position
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPos {
    pub pos: usize,
    levels: Vec<Level>,
}

impl ResolvedPos {
    pub fn resolve(root: &Node, pos: usize) -> Result<Self, EditError> {
        let size = root.content_size();
        if pos > size {
            return Err(EditError::OutOfBounds { pos, size });
        }

        let mut levels = Vec::new();
        let mut node = root;
        let mut start = 0;

        loop {
            let rel = pos - start;
            let mut offset = 0;
            let mut index = node.child_count();
            let mut descend = None;

            for (i, child) in node.content().iter().enumerate() {
                let end = offset + child.size();
                if rel == offset {
                    index = i;
                    break;
                }
                if rel < end {
                    index = i;
                    if !child.is_leaf() {
                        descend = Some((child, start + offset + 1));
                    }
                    break;
                }
                offset = end;
            }

            levels.push(Level {
                kind: node.kind(),
                start,
                index,
            });

            match descend {
                Some((child, child_start)) => {
                    node = child;
                    start = child_start;
                }
                None => break,
            }
        }

        Ok(Self { pos, levels })
    }

    /// Depth of the innermost parent (the root is depth 0)
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn parent(&self) -> &Level {
        &self.levels[self.levels.len() - 1]
    }

    pub fn parent_kind(&self) -> NodeKind {
        self.parent().kind
    }

    pub fn index(&self) -> usize {
        self.parent().index
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Innermost ancestor matching `pred`
    pub fn innermost(&self, pred: impl Fn(NodeKind) -> bool) -> Option<&Level> {
        self.levels.iter().rev().find(|level| pred(level.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::doc(vec![
            Node::paragraph(vec![Node::text("hi")]),
            Node::table(vec![Node::row(vec![Node::cell(vec![Node::paragraph(vec![
                Node::text("x"),
            ])])])]),
        ])
    }

    #[test]
    fn test_resolve_top_level() {
        let doc = sample();
        let rp = ResolvedPos::resolve(&doc, 4).unwrap();

        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.parent_kind(), NodeKind::Doc);
        assert_eq!(rp.index(), 1);
    }

    #[test]
    fn test_resolve_inside_text() {
        let doc = sample();
        let rp = ResolvedPos::resolve(&doc, 2).unwrap();

        assert_eq!(rp.depth(), 1);
        assert_eq!(rp.parent_kind(), NodeKind::Paragraph);
        assert_eq!(rp.parent().start, 1);
    }

    #[test]
    fn test_resolve_inside_cell() {
        let doc = sample();
        // doc > table(4) > row(5) > cell(6) > paragraph(7), text starts at 8
        let rp = ResolvedPos::resolve(&doc, 9).unwrap();

        assert_eq!(rp.parent_kind(), NodeKind::Paragraph);
        let cell = rp.innermost(|k| k == NodeKind::Cell).unwrap();
        assert_eq!(cell.start, 7);
    }

    #[test]
    fn test_resolve_out_of_bounds() {
        let doc = sample();
        let size = doc.content_size();

        assert!(ResolvedPos::resolve(&doc, size).is_ok());
        assert_eq!(
            ResolvedPos::resolve(&doc, size + 1),
            Err(EditError::OutOfBounds { pos: size + 1, size })
        );
    }
}
