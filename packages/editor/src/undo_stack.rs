//! # Undo/Redo Stack
//!
//! Tracks committed document snapshots and enables undo/redo.
//!
//! ## Design
//!
//! - Documents are immutable, so each entry simply keeps the snapshot before
//!   and after a commit (`Arc`, nothing is copied)
//! - Undo restores `before` and moves the entry to the redo stack
//! - Redo restores `after`
//! - New commits clear the redo stack
//! - Batches group several commits into one undo step
//!
//! Restored snapshots were themselves committed by the pipeline, so they
//! already satisfy every structural invariant.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.record(before, after);
//!
//! let restored = stack.undo();      // Some(before)
//! let reapplied = stack.redo();     // Some(after)
//! ```

use cellguard_model::Node;
use std::sync::Arc;

/// One undoable step: the document before and after it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: Arc<Node>,
    pub after: Arc<Node>,

    /// Optional description of this step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(before: Arc<Node>, after: Arc<Node>) -> Self {
        Self {
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Default)]
struct Batch {
    entry: Option<HistoryEntry>,
    description: Option<String>,
}

/// Undo/redo stack for committed documents
#[derive(Debug)]
pub struct UndoStack {
    /// Applied steps (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone steps (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<Batch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record a commit that turned `before` into `after`
    pub fn record(&mut self, before: Arc<Node>, after: Arc<Node>) {
        match &mut self.current_batch {
            Some(batch) => match &mut batch.entry {
                // Keep the earliest `before`, extend to the latest `after`
                Some(entry) => entry.after = after,
                None => batch.entry = Some(HistoryEntry::new(before, after)),
            },
            None => self.push_entry(HistoryEntry::new(before, after)),
        }
    }

    /// Start a batch of commits (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(Batch::default());
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if let Some(mut entry) = batch.entry {
                entry.description = batch.description;
                self.push_entry(entry);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates redo
        self.redo_stack.clear();
    }

    /// Undo the most recent step, returning the snapshot to restore
    pub fn undo(&mut self) -> Option<Arc<Node>> {
        self.end_batch();
        let entry = self.undo_stack.pop()?;
        let restored = Arc::clone(&entry.before);
        self.redo_stack.push(entry);
        Some(restored)
    }

    /// Redo the most recently undone step, returning the snapshot to restore
    pub fn redo(&mut self) -> Option<Arc<Node>> {
        let entry = self.redo_stack.pop()?;
        let restored = Arc::clone(&entry.after);
        self.undo_stack.push(entry);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(text: &str) -> Arc<Node> {
        Arc::new(Node::doc(vec![Node::paragraph(vec![Node::text(text)])]))
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo_restore_snapshots() {
        let mut stack = UndoStack::new();
        let (a, b) = (snapshot("a"), snapshot("b"));

        stack.record(a.clone(), b.clone());

        assert_eq!(stack.undo().as_deref(), Some(a.as_ref()));
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo().as_deref(), Some(b.as_ref()));
        assert!(stack.undo().is_some());
        assert!(stack.undo().is_none());
    }

    #[test]
    fn test_batched_commits() {
        let mut stack = UndoStack::new();
        let (a, b, c) = (snapshot("a"), snapshot("b"), snapshot("c"));

        stack.begin_batch();
        stack.set_batch_description("Fill cell");
        stack.record(a.clone(), b.clone());
        stack.record(b, c.clone());
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Fill cell"));

        assert_eq!(stack.undo().as_deref(), Some(a.as_ref()));
        assert_eq!(stack.redo().as_deref(), Some(c.as_ref()));
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut stack = UndoStack::new();
        stack.begin_batch();
        stack.end_batch();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(snapshot("a"), snapshot("b"));
        stack.undo();
        assert_eq!(stack.redo_levels(), 1);

        stack.record(snapshot("a"), snapshot("c"));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.record(snapshot(&i.to_string()), snapshot(&(i + 1).to_string()));
        }
        assert_eq!(stack.undo_levels(), 2);
    }
}
