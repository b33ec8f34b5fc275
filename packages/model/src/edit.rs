//! # Edits
//!
//! An [`Edit`] is an ordered list of [`Step`]s. Each step's positions refer to
//! the document produced by the steps before it, so edits compose by simple
//! concatenation.
//!
//! ## Step Semantics
//!
//! ### Replace
//! - Removes `from..to` and inserts `content` in its place
//! - Both ends must sit in the same parent; a range may cut into text nodes
//!   but never into the open/close tokens of a container
//! - Adjacent text nodes with identical marks are joined afterwards
//!
//! ### SetAttrs
//! - Replaces the attributes of the node starting at `pos`
//! - Never moves any position

use crate::mapping::{Mapping, StepMap};
use crate::{Attrs, EditError, Node, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stepType", rename_all = "camelCase")]
pub enum Step {
    Replace {
        from: usize,
        to: usize,
        content: Vec<Node>,
    },

    SetAttrs {
        pos: usize,
        attrs: Attrs,
    },
}

impl Step {
    /// Apply this step, producing a new root
    pub fn apply(&self, root: &Node) -> Result<Node, EditError> {
        let size = root.content_size();
        match self {
            Step::Replace { from, to, content } => {
                if from > to {
                    return Err(EditError::InvalidRange {
                        from: *from,
                        to: *to,
                    });
                }
                if *to > size {
                    return Err(EditError::OutOfBounds { pos: *to, size });
                }
                replace_in(root, *from, *to, content, 0)
            }

            Step::SetAttrs { pos, attrs } => {
                if *pos >= size {
                    return Err(EditError::OutOfBounds { pos: *pos, size });
                }
                update_at(root, *pos, 0, &|node| node.with_attrs(attrs.clone()))
            }
        }
    }

    pub fn step_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, content } => {
                StepMap::new(*from, to - from, content.iter().map(Node::size).sum())
            }
            Step::SetAttrs { .. } => StepMap::identity(),
        }
    }
}

fn replace_in(
    node: &Node,
    from: usize,
    to: usize,
    content: &[Node],
    base: usize,
) -> Result<Node, EditError> {
    let mut offset = 0;
    for (index, child) in node.content().iter().enumerate() {
        let end = offset + child.size();
        if !child.is_leaf() && from > offset && to < end {
            let (inner_from, inner_to) = (from - offset - 1, to - offset - 1);
            let inner = replace_in(child, inner_from, inner_to, content, base + offset + 1)?;
            return Ok(node.replace_child(index, inner));
        }
        if offset > to {
            break;
        }
        offset = end;
    }

    splice(node, from, to, content, base)
}

/// Replace `from..to` among the direct children of `node`
fn splice(
    node: &Node,
    from: usize,
    to: usize,
    content: &[Node],
    base: usize,
) -> Result<Node, EditError> {
    if node.is_leaf() {
        return Err(EditError::InvalidContent(format!(
            "cannot edit inside {} node",
            node.kind().name()
        )));
    }

    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut offset = 0;

    for child in node.content() {
        let start = offset;
        let end = offset + child.size();
        offset = end;

        if end <= from {
            before.push(child.clone());
            continue;
        }
        if start >= to {
            after.push(child.clone());
            continue;
        }

        let cut_left = start < from;
        let cut_right = end > to;
        if (cut_left || cut_right) && !child.is_text() {
            return Err(EditError::InvalidRange {
                from: base + from,
                to: base + to,
            });
        }
        if cut_left {
            before.push(child.cut_text(0, from - start));
        }
        if cut_right {
            after.push(child.cut_text(to - start, end - start));
        }
    }

    for inserted in content {
        if inserted.is_leaf() && !node.kind().is_textblock() {
            return Err(EditError::InvalidContent(format!(
                "{} is not allowed in {}",
                inserted.kind().name(),
                node.kind().name()
            )));
        }
        if inserted.kind() == NodeKind::Doc {
            return Err(EditError::InvalidContent("doc cannot be nested".to_string()));
        }
    }

    let mut children = before;
    children.extend(content.iter().cloned());
    children.extend(after);

    Ok(node.with_content(join_text(children)))
}

/// Drop empty text nodes and merge neighbours that share marks
fn join_text(children: Vec<Node>) -> Vec<Node> {
    let mut joined: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        if child.is_text() && child.size() == 0 {
            continue;
        }
        if let Some(last) = joined.last_mut() {
            if last.is_text() && child.is_text() && last.marks() == child.marks() {
                let text = format!(
                    "{}{}",
                    last.as_text().unwrap_or_default(),
                    child.as_text().unwrap_or_default()
                );
                *last = last.with_text(text);
                continue;
            }
        }
        joined.push(child);
    }
    joined
}

fn update_at(
    node: &Node,
    pos: usize,
    base: usize,
    f: &dyn Fn(&Node) -> Node,
) -> Result<Node, EditError> {
    let mut offset = 0;
    for (index, child) in node.content().iter().enumerate() {
        let end = offset + child.size();
        if pos == offset {
            return Ok(node.replace_child(index, f(child)));
        }
        if pos < end {
            if child.is_leaf() {
                break;
            }
            let inner = update_at(child, pos - offset - 1, base + offset + 1, f)?;
            return Ok(node.replace_child(index, inner));
        }
        offset = end;
    }
    Err(EditError::NoNodeAt(base + pos))
}

/// Where an edit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOrigin {
    /// Programmatic or structural command
    #[default]
    Api,
    /// Keyboard text input
    Typed,
    /// Clipboard paste
    Paste,
    /// Generated by a correction pass
    Correction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMeta {
    pub origin: EditOrigin,
    pub add_to_history: bool,
}

impl Default for EditMeta {
    fn default() -> Self {
        Self {
            origin: EditOrigin::Api,
            add_to_history: true,
        }
    }
}

/// Ordered list of steps plus metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    steps: Vec<Step>,

    #[serde(default)]
    meta: EditMeta,
}

impl Edit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: EditOrigin) -> Self {
        self.meta.origin = origin;
        self
    }

    /// Keep this edit out of undo history
    pub fn without_history(mut self) -> Self {
        self.meta.add_to_history = false;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn replace(self, from: usize, to: usize, content: Vec<Node>) -> Self {
        self.step(Step::Replace { from, to, content })
    }

    pub fn insert(self, pos: usize, node: Node) -> Self {
        self.replace(pos, pos, vec![node])
    }

    pub fn delete(self, from: usize, to: usize) -> Self {
        self.replace(from, to, Vec::new())
    }

    pub fn set_attrs(self, pos: usize, attrs: Attrs) -> Self {
        self.step(Step::SetAttrs { pos, attrs })
    }

    /// Append another edit whose positions refer to this edit's output
    pub fn concat(mut self, other: Edit) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn meta(&self) -> &EditMeta {
        &self.meta
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order; the input root is left untouched
    pub fn apply(&self, root: &Node) -> Result<(Node, Mapping), EditError> {
        let mut mapping = Mapping::new();
        let mut current = root.clone();
        for step in &self.steps {
            current = step.apply(&current)?;
            mapping.push(step.step_map());
        }
        Ok((current, mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(text: &str) -> Node {
        Node::paragraph(vec![Node::text(text)])
    }

    #[test]
    fn test_insert_text_splits_and_joins() {
        let doc = Node::doc(vec![para("abcd")]);
        let edit = Edit::new().insert(3, Node::text("XY"));

        let (result, mapping) = edit.apply(&doc).unwrap();
        let paragraph = result.child(0).unwrap();

        assert_eq!(paragraph.child_count(), 1);
        assert_eq!(paragraph.text_content(), "abXYcd");
        assert_eq!(mapping.maps(), &[StepMap::new(3, 0, 2)]);
    }

    #[test]
    fn test_replace_text_range() {
        let doc = Node::doc(vec![para("hello world")]);
        let edit = Edit::new().replace(1, 6, vec![Node::text("bye")]);

        let (result, _) = edit.apply(&doc).unwrap();
        assert_eq!(result.text_content(), "bye world");
    }

    #[test]
    fn test_delete_whole_block() {
        let doc = Node::doc(vec![para("a"), para("b"), para("c")]);
        let (result, _) = Edit::new().delete(3, 6).apply(&doc).unwrap();

        assert_eq!(result.child_count(), 2);
        assert_eq!(result.text_content(), "ac");
    }

    #[test]
    fn test_marks_prevent_join() {
        let bold = Node::text("B").with_marks(vec![crate::Mark::new("bold")]);
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text("a"), bold])]);

        let (result, _) = Edit::new().insert(2, Node::text("c")).apply(&doc).unwrap();
        let paragraph = result.child(0).unwrap();

        assert_eq!(paragraph.child_count(), 2);
        assert_eq!(paragraph.child(0).unwrap().as_text(), Some("ac"));
        assert_eq!(paragraph.child(1).unwrap().marks().len(), 1);
    }

    #[test]
    fn test_range_crossing_blocks_is_rejected() {
        let doc = Node::doc(vec![para("ab"), para("cd")]);
        let err = Edit::new().delete(2, 6).apply(&doc).unwrap_err();

        assert_eq!(err, EditError::InvalidRange { from: 2, to: 6 });
    }

    #[test]
    fn test_crossing_range_is_reported_before_content() {
        let doc = Node::doc(vec![para("ab"), para("cd")]);
        let err = Edit::new()
            .replace(2, 6, vec![Node::text("x")])
            .apply(&doc)
            .unwrap_err();

        assert_eq!(err, EditError::InvalidRange { from: 2, to: 6 });
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let doc = Node::doc(vec![para("ab")]);
        let err = Edit::new().delete(0, 10).apply(&doc).unwrap_err();

        assert_eq!(err, EditError::OutOfBounds { pos: 10, size: 4 });
    }

    #[test]
    fn test_text_outside_textblock_is_rejected() {
        let doc = Node::doc(vec![para("ab")]);
        let err = Edit::new().insert(0, Node::text("x")).apply(&doc).unwrap_err();

        assert!(matches!(err, EditError::InvalidContent(_)));
    }

    #[test]
    fn test_set_attrs_targets_nested_node() {
        let doc = Node::doc(vec![para("a"), Node::separator("\u{200B}")]);
        let (result, mapping) = Edit::new().set_attrs(3, Attrs::new()).apply(&doc).unwrap();

        assert!(!result.child(1).unwrap().is_unremovable());
        assert_eq!(mapping.map(5, crate::Assoc::After), 5);
    }

    #[test]
    fn test_set_attrs_requires_node_start() {
        let doc = Node::doc(vec![para("abc")]);
        let err = Edit::new().set_attrs(2, Attrs::new()).apply(&doc).unwrap_err();

        assert_eq!(err, EditError::NoNodeAt(2));
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let doc = Node::doc(vec![para("abc")]);
        let before = doc.clone();
        let _ = Edit::new().delete(0, 5).apply(&doc).unwrap();

        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_serialization() {
        let edit = Edit::new()
            .with_origin(EditOrigin::Paste)
            .insert(1, Node::text("hi"));

        let json = serde_json::to_string(&edit).unwrap();
        let deserialized: Edit = serde_json::from_str(&json).unwrap();

        assert_eq!(edit, deserialized);
    }
}
