//! # Cell Input
//!
//! Narrow input transforms that only apply while the caret (or the whole
//! selection) is inside a table cell:
//!
//! - typed or pasted text has the table delimiter rewritten so it cannot break
//!   the external table syntax
//! - unmodified Enter inserts a hard break instead of splitting the block
//!
//! Outside a cell every hook declines and the host's default handling runs.

use crate::classify::is_cell_kind;
use crate::config::EditorConfig;
use cellguard_model::{Assoc, Edit, EditOrigin, Mapping, Node, NodeKind, ResolvedPos, Step};

/// The only piece of host state the input hooks need
pub trait InputContext {
    fn in_cell(&self) -> bool;
}

impl InputContext for bool {
    fn in_cell(&self) -> bool {
        *self
    }
}

/// Input context derived from a document and a selection range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretContext {
    in_cell: bool,
}

impl CaretContext {
    /// Both ends of `from..to` must sit in the same cell
    pub fn at(root: &Node, from: usize, to: usize) -> Self {
        let cell = cell_start(root, from);
        Self {
            in_cell: cell.is_some() && cell == cell_start(root, to),
        }
    }
}

impl InputContext for CaretContext {
    fn in_cell(&self) -> bool {
        self.in_cell
    }
}

/// Content start of the innermost cell around `pos`
pub fn cell_start(root: &Node, pos: usize) -> Option<usize> {
    let resolved = ResolvedPos::resolve(root, pos).ok()?;
    resolved.innermost(is_cell_kind).map(|level| level.start)
}

/// Where an inline leaf typed over `from..to` ends up
///
/// Text and hard breaks may only live in textblocks. A caret that sits
/// directly in a cell (or the document) is moved into a neighbouring
/// paragraph, or gets a new paragraph when there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTarget {
    /// Replace `from..to` inside one textblock
    Inline { from: usize, to: usize },

    /// Replace `from..to` with a new paragraph holding the leaf
    Wrapped { from: usize, to: usize },
}

impl InsertTarget {
    /// `None` when the range spans more than one block
    pub fn resolve(root: &Node, from: usize, to: usize) -> Option<Self> {
        let start = ResolvedPos::resolve(root, from).ok()?;
        let end = ResolvedPos::resolve(root, to).ok()?;
        let parent = start.parent();
        if parent.start != end.parent().start {
            return None;
        }
        if parent.kind.is_textblock() {
            return Some(InsertTarget::Inline { from, to });
        }
        if !(is_cell_kind(parent.kind) || parent.kind == NodeKind::Doc) {
            return None;
        }
        if from != to {
            return Some(InsertTarget::Wrapped { from, to });
        }

        let parent_node = match parent.start {
            0 => root,
            content_start => root.node_at(content_start - 1)?,
        };
        let index = start.index();
        let is_paragraph = |node: &Node| node.kind() == NodeKind::Paragraph;

        if parent_node.child(index).is_some_and(is_paragraph) {
            return Some(InsertTarget::Inline {
                from: from + 1,
                to: from + 1,
            });
        }
        let previous = index.checked_sub(1).and_then(|i| parent_node.child(i));
        if previous.is_some_and(is_paragraph) {
            return Some(InsertTarget::Inline {
                from: from - 1,
                to: from - 1,
            });
        }
        Some(InsertTarget::Wrapped { from, to })
    }

    /// Edit that puts `leaf` at this target
    pub fn edit(&self, origin: EditOrigin, leaf: Node) -> Edit {
        let edit = Edit::new().with_origin(origin);
        match *self {
            InsertTarget::Inline { from, to } => edit.replace(from, to, vec![leaf]),
            InsertTarget::Wrapped { from, to } => {
                edit.replace(from, to, vec![Node::paragraph(vec![leaf])])
            }
        }
    }

    /// Caret position right after the inserted leaf in the committed document
    pub fn caret_after(&self, mapping: &Mapping) -> usize {
        match *self {
            InsertTarget::Inline { to, .. } => mapping.map(to, Assoc::After),
            // Inside the new paragraph, before its closing token
            InsertTarget::Wrapped { to, .. } => mapping.map(to, Assoc::After) - 1,
        }
    }
}

/// Keys the input hooks react to; anything else is `Char`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

#[derive(Debug, Clone)]
pub struct CellInputInterceptor {
    delimiter: char,
    replacement: char,
    soft_break_on_enter: bool,
}

impl CellInputInterceptor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            replacement: config.delimiter_replacement,
            soft_break_on_enter: config.soft_break_on_enter,
        }
    }

    /// Rewrite every delimiter, or `None` if there is nothing to rewrite
    pub fn escape_delimiters(&self, text: &str) -> Option<String> {
        text.contains(self.delimiter)
            .then(|| text.replace(self.delimiter, &self.replacement.to_string()))
    }

    /// Typed text hook: `Some(rewritten)` inside a cell, `None` to insert as typed
    pub fn on_text_input(&self, cx: &impl InputContext, text: &str) -> Option<String> {
        if !cx.in_cell() {
            return None;
        }
        self.escape_delimiters(text)
    }

    /// Paste hook for the plain-text form of the clipboard
    pub fn on_paste(&self, cx: &impl InputContext, plain_text: &str) -> Option<String> {
        if !cx.in_cell() {
            return None;
        }
        self.escape_delimiters(plain_text)
    }

    /// `true` if the key should insert a hard break instead of the default action
    pub fn on_key_down(&self, cx: &impl InputContext, key: Key, modifiers: Modifiers) -> bool {
        self.soft_break_on_enter && key == Key::Enter && modifiers.is_empty() && cx.in_cell()
    }

    /// Escape text inserted into cells by typed or pasted edits
    ///
    /// Edits from any other origin pass through untouched. Each step is
    /// checked against the document produced by the steps before it.
    pub fn rewrite_edit(&self, root: &Node, edit: Edit) -> Edit {
        if !matches!(edit.meta().origin, EditOrigin::Typed | EditOrigin::Paste) {
            return edit;
        }

        let mut current = root.clone();
        let mut steps = Vec::with_capacity(edit.steps().len());
        let mut rewritten = false;

        for (i, step) in edit.steps().iter().enumerate() {
            let step = match step {
                Step::Replace { from, to, content } if cell_start(&current, *from).is_some() => {
                    let content: Vec<Node> =
                        content.iter().map(|node| self.escape_node(node)).collect();
                    Step::Replace {
                        from: *from,
                        to: *to,
                        content,
                    }
                }
                other => other.clone(),
            };
            rewritten |= step != edit.steps()[i];

            match step.apply(&current) {
                Ok(next) => current = next,
                Err(_) => {
                    // Leave the rest as-is; the pipeline reports the failure
                    steps.push(step);
                    steps.extend(edit.steps()[i + 1..].iter().cloned());
                    break;
                }
            }
            steps.push(step);
        }

        if rewritten {
            tracing::trace!("escaped delimiters in cell input");
        }
        edit.with_steps(steps)
    }

    fn escape_node(&self, node: &Node) -> Node {
        if let Some(text) = node.as_text() {
            return match self.escape_delimiters(text) {
                Some(escaped) => node.with_text(escaped),
                None => node.clone(),
            };
        }
        if node.content().is_empty() {
            return node.clone();
        }
        node.with_content(node.content().iter().map(|child| self.escape_node(child)).collect())
    }
}

impl Default for CellInputInterceptor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // paragraph "ab" 0..4, table 4..13 with text "x" at 8..9
    fn doc() -> Node {
        Node::doc(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::table(vec![Node::row(vec![Node::header_cell(vec![Node::paragraph(vec![
                Node::text("x"),
            ])])])]),
        ])
    }

    #[test]
    fn test_text_input_escaped_only_in_cell() {
        let interceptor = CellInputInterceptor::default();

        assert_eq!(interceptor.on_text_input(&true, "a|b|c"), Some("a/b/c".to_string()));
        assert_eq!(interceptor.on_text_input(&false, "a|b|c"), None);
        assert_eq!(interceptor.on_text_input(&true, "abc"), None);
    }

    #[test]
    fn test_paste_escaped_only_in_cell() {
        let interceptor = CellInputInterceptor::default();

        assert_eq!(interceptor.on_paste(&true, "|x|"), Some("/x/".to_string()));
        assert_eq!(interceptor.on_paste(&false, "|x|"), None);
    }

    #[test]
    fn test_enter_in_cell() {
        let interceptor = CellInputInterceptor::default();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::none()
        };

        assert!(interceptor.on_key_down(&true, Key::Enter, Modifiers::none()));
        assert!(!interceptor.on_key_down(&true, Key::Enter, shift));
        assert!(!interceptor.on_key_down(&false, Key::Enter, Modifiers::none()));
        assert!(!interceptor.on_key_down(&true, Key::Char('a'), Modifiers::none()));
    }

    #[test]
    fn test_enter_disabled_by_config() {
        let config = EditorConfig {
            soft_break_on_enter: false,
            ..EditorConfig::default()
        };
        let interceptor = CellInputInterceptor::new(&config);
        assert!(!interceptor.on_key_down(&true, Key::Enter, Modifiers::none()));
    }

    #[test]
    fn test_caret_context() {
        let doc = doc();

        assert!(!CaretContext::at(&doc, 2, 2).in_cell());
        assert!(CaretContext::at(&doc, 9, 9).in_cell());
        assert!(!CaretContext::at(&doc, 2, 9).in_cell());
        assert!(!CaretContext::at(&doc, 4, 4).in_cell());
    }

    // table(row(header_cell[para "ab", para "cd"])): paragraphs at 3..7 and 7..11
    fn two_paragraph_cell() -> Node {
        Node::doc(vec![Node::table(vec![Node::row(vec![Node::header_cell(vec![
            Node::paragraph(vec![Node::text("ab")]),
            Node::paragraph(vec![Node::text("cd")]),
        ])])])])
    }

    #[test]
    fn test_insert_target_inside_paragraph() {
        let doc = two_paragraph_cell();
        assert_eq!(
            InsertTarget::resolve(&doc, 5, 6),
            Some(InsertTarget::Inline { from: 5, to: 6 })
        );
    }

    #[test]
    fn test_insert_target_across_paragraphs() {
        let doc = two_paragraph_cell();
        assert_eq!(InsertTarget::resolve(&doc, 5, 8), None);
    }

    #[test]
    fn test_insert_target_between_paragraphs_of_a_cell() {
        let doc = two_paragraph_cell();

        // Cell content start: into the first paragraph
        assert_eq!(
            InsertTarget::resolve(&doc, 3, 3),
            Some(InsertTarget::Inline { from: 4, to: 4 })
        );
        // Cell content end: to the end of the last paragraph
        assert_eq!(
            InsertTarget::resolve(&doc, 11, 11),
            Some(InsertTarget::Inline { from: 10, to: 10 })
        );
    }

    #[test]
    fn test_insert_target_in_empty_cell() {
        let doc = Node::doc(vec![Node::table(vec![Node::row(vec![Node::cell(vec![])])])]);
        let target = InsertTarget::resolve(&doc, 3, 3).unwrap();
        assert_eq!(target, InsertTarget::Wrapped { from: 3, to: 3 });

        let (fixed, mapping) = target
            .edit(EditOrigin::Typed, Node::hard_break())
            .apply(&doc)
            .unwrap();
        let cell = fixed.child(0).unwrap().child(0).unwrap().child(0).unwrap();
        assert_eq!(cell.child(0).unwrap().kind(), NodeKind::Paragraph);
        // para content starts at 4, the break fills 4..5
        assert_eq!(target.caret_after(&mapping), 5);
    }

    #[test]
    fn test_insert_target_between_rows_is_refused() {
        let doc = two_paragraph_cell();
        // Position 1 sits directly in the table, before its only row
        assert_eq!(InsertTarget::resolve(&doc, 1, 1), None);
    }

    #[test]
    fn test_rewrite_edit_escapes_typed_text_in_cell() {
        let interceptor = CellInputInterceptor::default();
        let edit = Edit::new()
            .with_origin(EditOrigin::Typed)
            .insert(9, Node::text("|"))
            .insert(2, Node::text("|"));

        let rewritten = interceptor.rewrite_edit(&doc(), edit);

        assert_eq!(
            rewritten.steps(),
            &[
                Step::Replace {
                    from: 9,
                    to: 9,
                    content: vec![Node::text("/")],
                },
                Step::Replace {
                    from: 2,
                    to: 2,
                    content: vec![Node::text("|")],
                },
            ]
        );
    }

    #[test]
    fn test_rewrite_edit_ignores_api_edits() {
        let interceptor = CellInputInterceptor::default();
        let edit = Edit::new().insert(9, Node::text("|"));

        assert_eq!(interceptor.rewrite_edit(&doc(), edit.clone()), edit);
    }

    #[test]
    fn test_escape_keeps_marks() {
        let interceptor = CellInputInterceptor::default();
        let bold = Node::text("a|b").with_marks(vec![cellguard_model::Mark::new("bold")]);
        let escaped = interceptor.escape_node(&Node::paragraph(vec![bold]));

        let text = escaped.child(0).unwrap();
        assert_eq!(text.as_text(), Some("a/b"));
        assert_eq!(text.marks().len(), 1);
    }
}
