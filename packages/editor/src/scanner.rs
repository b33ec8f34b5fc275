//! # Document Scanner
//!
//! One depth-first walk per document that records every table and every
//! protected separator together with its position and parent slot. The guard
//! and both correction passes read from the same [`ScanResult`] instead of
//! walking the tree again.

use crate::classify::{is_protected_separator, is_table};
use cellguard_model::{walk_document, walk_node, Node, NodeContext, Visitor};
use std::collections::HashMap;

/// A node found by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEntry<'a> {
    pub node: &'a Node,

    /// Absolute start position
    pub pos: usize,

    /// Content start of the parent, identifies the sibling group
    pub parent: usize,

    /// Slot index among the parent's children
    pub index: usize,
}

impl ScanEntry<'_> {
    pub fn end(&self) -> usize {
        self.pos + self.node.size()
    }
}

/// A separator with a table on each side
#[derive(Debug, Clone, Copy)]
pub struct Sandwich<'s, 'a> {
    pub before: &'s ScanEntry<'a>,
    pub separator: &'s ScanEntry<'a>,
    pub after: &'s ScanEntry<'a>,
}

/// Tables and separators in document order
#[derive(Debug, Default)]
pub struct ScanResult<'a> {
    pub tables: Vec<ScanEntry<'a>>,
    pub separators: Vec<ScanEntry<'a>>,
    table_slots: HashMap<(usize, usize), usize>,
}

impl<'a> ScanResult<'a> {
    /// The table in slot `index` of `parent`, if that slot holds one
    pub fn table_at_slot(&self, parent: usize, index: usize) -> Option<&ScanEntry<'a>> {
        self.table_slots
            .get(&(parent, index))
            .map(|&i| &self.tables[i])
    }

    pub fn next_sibling_table(&self, entry: &ScanEntry<'a>) -> Option<&ScanEntry<'a>> {
        self.table_at_slot(entry.parent, entry.index + 1)
    }

    pub fn previous_sibling_table(&self, entry: &ScanEntry<'a>) -> Option<&ScanEntry<'a>> {
        let index = entry.index.checked_sub(1)?;
        self.table_at_slot(entry.parent, index)
    }

    /// Separators currently doing their job
    pub fn sandwiched_separators(&self) -> impl Iterator<Item = Sandwich<'_, 'a>> + '_ {
        self.separators.iter().filter_map(move |separator| {
            Some(Sandwich {
                before: self.previous_sibling_table(separator)?,
                separator,
                after: self.next_sibling_table(separator)?,
            })
        })
    }
}

pub struct DocumentScanner;

impl DocumentScanner {
    pub fn scan(root: &Node) -> ScanResult<'_> {
        let mut visitor = ScanVisitor {
            result: ScanResult::default(),
        };
        walk_document(&mut visitor, root);

        tracing::trace!(
            tables = visitor.result.tables.len(),
            separators = visitor.result.separators.len(),
            "scanned document"
        );
        visitor.result
    }
}

struct ScanVisitor<'a> {
    result: ScanResult<'a>,
}

impl<'a> Visitor<'a> for ScanVisitor<'a> {
    fn visit_node(&mut self, node: &'a Node, cx: NodeContext) {
        let entry = ScanEntry {
            node,
            pos: cx.pos,
            parent: cx.parent,
            index: cx.index,
        };

        if is_table(node) {
            self.result
                .table_slots
                .insert((cx.parent, cx.index), self.result.tables.len());
            self.result.tables.push(entry);
        } else if is_protected_separator(node) {
            self.result.separators.push(entry);
        }

        walk_node(self, node, cx);
    }
}
