//! # Edit Session
//!
//! The live editing state of one editor surface: the current document
//! snapshot, the selection, and undo history.
//!
//! Every change goes through the [`EditPipeline`]. The session swaps in the
//! committed snapshot in one step and maps the selection through the
//! commit's mapping, so observers never see an uncorrected intermediate
//! document. Old snapshots stay valid for as long as anyone holds them.

use crate::config::EditorConfig;
use crate::input::{CaretContext, InsertTarget, Key, Modifiers};
use crate::pipeline::{EditPipeline, Outcome};
use crate::undo_stack::UndoStack;
use crate::EditorError;
use cellguard_model::{Assoc, Edit, EditError, EditOrigin, Mapping, Node};
use std::sync::Arc;

/// Selection as anchor/head positions (equal for a plain caret)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn map(&self, mapping: &Mapping) -> Self {
        Self {
            anchor: mapping.map(self.anchor, Assoc::After),
            head: mapping.map(self.head, Assoc::After),
        }
    }

    fn clamp(&self, size: usize) -> Self {
        Self {
            anchor: self.anchor.min(size),
            head: self.head.min(size),
        }
    }
}

/// Result of a key press or text input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The engine handled the input
    Handled(Outcome),

    /// The host should run its default behaviour
    Unhandled,
}

/// Single editing session over one document
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Current version number (increments on each commit, undo or redo)
    pub version: u64,

    doc: Arc<Node>,
    selection: Selection,
    pipeline: EditPipeline,
    history: UndoStack,
}

impl EditSession {
    pub fn new(id: impl Into<String>, doc: Node, config: EditorConfig) -> Self {
        Self {
            id: id.into(),
            version: 0,
            doc: Arc::new(doc),
            selection: Selection::caret(0),
            history: UndoStack::with_max_levels(config.history_depth),
            pipeline: EditPipeline::new(config),
        }
    }

    /// Current document snapshot
    pub fn doc(&self) -> &Arc<Node> {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        let size = self.doc.content_size();
        if selection.to() > size {
            return Err(EditError::OutOfBounds {
                pos: selection.to(),
                size,
            }
            .into());
        }
        self.selection = selection;
        Ok(())
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoStack {
        &mut self.history
    }

    pub fn caret_context(&self) -> CaretContext {
        CaretContext::at(&self.doc, self.selection.from(), self.selection.to())
    }

    /// Run `edit` through the pipeline and commit it if accepted
    pub fn propose(&mut self, edit: Edit) -> Result<Outcome, EditorError> {
        let record = edit.meta().add_to_history;
        let outcome = self.pipeline.propose(&self.doc, edit)?;

        if let Outcome::Committed { doc, mapping } = &outcome {
            let before = std::mem::replace(&mut self.doc, Arc::new(doc.clone()));
            if record {
                self.history.record(before, Arc::clone(&self.doc));
            }
            self.selection = self.selection.map(mapping).clamp(self.doc.content_size());
            self.version += 1;
        }

        Ok(outcome)
    }

    /// Insert typed text over the selection
    ///
    /// Unhandled when the selection spans more than one block.
    pub fn type_text(&mut self, text: &str) -> Result<KeyOutcome, EditorError> {
        let cx = self.caret_context();
        let text = self
            .pipeline
            .interceptor()
            .on_text_input(&cx, text)
            .unwrap_or_else(|| text.to_string());

        self.insert_leaf(EditOrigin::Typed, Node::text(text))
    }

    /// Paste the plain-text form of the clipboard over the selection
    pub fn paste_text(&mut self, plain_text: &str) -> Result<KeyOutcome, EditorError> {
        let cx = self.caret_context();
        let text = self
            .pipeline
            .interceptor()
            .on_paste(&cx, plain_text)
            .unwrap_or_else(|| plain_text.to_string());

        self.insert_leaf(EditOrigin::Paste, Node::text(text))
    }

    /// Key press; only unmodified Enter inside a cell is handled here
    pub fn press_key(&mut self, key: Key, modifiers: Modifiers) -> Result<KeyOutcome, EditorError> {
        let cx = self.caret_context();
        if !self.pipeline.interceptor().on_key_down(&cx, key, modifiers) {
            return Ok(KeyOutcome::Unhandled);
        }
        self.insert_leaf(EditOrigin::Typed, Node::hard_break())
    }

    fn insert_leaf(&mut self, origin: EditOrigin, leaf: Node) -> Result<KeyOutcome, EditorError> {
        let (from, to) = (self.selection.from(), self.selection.to());
        let Some(target) = InsertTarget::resolve(&self.doc, from, to) else {
            tracing::trace!(from, to, "selection spans blocks, leaving input to the host");
            return Ok(KeyOutcome::Unhandled);
        };

        let outcome = self.propose(target.edit(origin, leaf))?;
        if let Outcome::Committed { mapping, .. } = &outcome {
            let caret = target.caret_after(mapping).min(self.doc.content_size());
            self.selection = Selection::caret(caret);
        }
        Ok(KeyOutcome::Handled(outcome))
    }

    /// Restore the snapshot before the last recorded commit
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(doc) => {
                self.restore(doc);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(doc) => {
                self.restore(doc);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, doc: Arc<Node>) {
        self.doc = doc;
        self.selection = self.selection.clamp(self.doc.content_size());
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(doc: Node) -> EditSession {
        EditSession::new("client-1", doc, EditorConfig::default())
    }

    #[test]
    fn test_session_creation() {
        let session = session(Node::doc(vec![Node::paragraph(vec![])]));

        assert_eq!(session.id, "client-1");
        assert_eq!(session.version, 0);
        assert_eq!(session.selection(), Selection::caret(0));
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_typing_moves_caret_and_records_history() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![])]));
        session.set_selection(Selection::caret(1)).unwrap();

        session.type_text("a|b").unwrap();

        assert_eq!(session.doc().text_content(), "a|b");
        assert_eq!(session.selection(), Selection::caret(4));
        assert_eq!(session.version, 1);
        assert!(session.history().can_undo());
    }

    #[test]
    fn test_selection_out_of_bounds() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![])]));
        assert!(session.set_selection(Selection::caret(3)).is_err());
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![Node::text("hello")])]));
        session.set_selection(Selection::range(6, 1)).unwrap();

        session.type_text("bye").unwrap();
        assert_eq!(session.doc().text_content(), "bye");
    }

    #[test]
    fn test_enter_outside_cell_is_unhandled() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![])]));
        session.set_selection(Selection::caret(1)).unwrap();

        let outcome = session.press_key(Key::Enter, Modifiers::none()).unwrap();
        assert_eq!(outcome, KeyOutcome::Unhandled);
        assert_eq!(session.version, 0);
    }

    #[test]
    fn test_undo_redo() {
        let original = Node::doc(vec![Node::paragraph(vec![])]);
        let mut session = session(original.clone());
        session.set_selection(Selection::caret(1)).unwrap();
        session.type_text("x").unwrap();
        let typed = session.doc().clone();

        assert!(session.undo());
        assert_eq!(session.doc().as_ref(), &original);
        assert_eq!(session.selection(), Selection::caret(2));

        assert!(session.redo());
        assert!(Arc::ptr_eq(session.doc(), &typed));
        assert!(!session.redo());
    }

    #[test]
    fn test_edits_without_history_are_not_undoable() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![])]));
        let edit = Edit::new().without_history().insert(1, Node::text("x"));

        session.propose(edit).unwrap();
        assert!(!session.history().can_undo());
        assert_eq!(session.version, 1);
    }

    #[test]
    fn test_old_snapshot_stays_valid() {
        let mut session = session(Node::doc(vec![Node::paragraph(vec![])]));
        let before = Arc::clone(session.doc());

        session.propose(Edit::new().insert(1, Node::text("x"))).unwrap();

        assert_eq!(before.text_content(), "");
        assert_eq!(session.doc().text_content(), "x");
    }
}
