//! # Correction Passes
//!
//! After an edit is applied, passes inspect the scanned document and propose
//! corrective replacements and insertions that restore the structural
//! invariants.
//!
//! ## Design
//!
//! Passes are:
//! - **Pure**: they read a [`ScanResult`] and return a list of corrections
//! - **Idempotent**: running a pass on its own output proposes nothing
//! - **Independent**: no pass can create work for another (a separator
//!   paragraph is never a table, and header rewrites never move a position)
//!
//! The [`PassEngine`] runs every registered pass over one scan and assembles a
//! single corrective [`Edit`]: passes in registration order, each pass's
//! corrections in descending position order, and every correction re-targeted
//! through the mapping of the steps already added.

mod header_rows;
mod table_separators;

pub use header_rows::{normalize_table, HeaderRowPass};
pub use table_separators::TableSeparatorPass;

use crate::config::EditorConfig;
use crate::scanner::ScanResult;
use cellguard_model::{Assoc, Edit, EditOrigin, Mapping, Node, Step};

/// A change proposed by a pass, in positions of the scanned document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    Replace { from: usize, to: usize, node: Node },
    Insert { pos: usize, node: Node },
}

impl Correction {
    pub fn pos(&self) -> usize {
        match self {
            Correction::Replace { from, .. } => *from,
            Correction::Insert { pos, .. } => *pos,
        }
    }

    fn into_step(self, mapping: &Mapping) -> Step {
        match self {
            Correction::Replace { from, to, node } => Step::Replace {
                from: mapping.map(from, Assoc::After),
                to: mapping.map(to, Assoc::Before),
                content: vec![node],
            },
            Correction::Insert { pos, node } => {
                let pos = mapping.map(pos, Assoc::Before);
                Step::Replace {
                    from: pos,
                    to: pos,
                    content: vec![node],
                }
            }
        }
    }
}

/// Pass that restores one structural invariant
pub trait CorrectionPass: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Analyze the scanned document and propose corrections
    fn analyze(&self, scan: &ScanResult<'_>, config: &EditorConfig) -> Vec<Correction>;
}

/// Pass engine that runs all registered passes
#[derive(Debug)]
pub struct PassEngine {
    passes: Vec<Box<dyn CorrectionPass>>,
}

impl PassEngine {
    /// Create engine with default passes
    pub fn new() -> Self {
        Self::from_config(&EditorConfig::default())
    }

    /// Create engine with the passes enabled in `config`
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut passes: Vec<Box<dyn CorrectionPass>> = Vec::new();
        if config.normalize_headers {
            passes.push(Box::new(HeaderRowPass));
        }
        if config.separate_tables {
            passes.push(Box::new(TableSeparatorPass));
        }
        Self { passes }
    }

    pub fn with_passes(passes: Vec<Box<dyn CorrectionPass>>) -> Self {
        Self { passes }
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Build one corrective edit from every pass's proposals
    pub fn build_edit(&self, scan: &ScanResult<'_>, config: &EditorConfig) -> Edit {
        let mut edit = Edit::new().with_origin(EditOrigin::Correction);
        let mut mapping = Mapping::new();

        for pass in &self.passes {
            let mut corrections = pass.analyze(scan, config);
            if corrections.is_empty() {
                continue;
            }
            tracing::trace!(
                pass = pass.name(),
                count = corrections.len(),
                "pass proposed corrections"
            );

            // Descending, so applying one never shifts the ones still pending
            corrections.sort_by(|a, b| b.pos().cmp(&a.pos()));

            for correction in corrections {
                let step = correction.into_step(&mapping);
                mapping.push(step.step_map());
                edit = edit.step(step);
            }
        }

        edit
    }
}

impl Default for PassEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DocumentScanner;

    fn body_table(kind_row0: fn(Vec<Node>) -> Node) -> Node {
        Node::table(vec![
            Node::row(vec![kind_row0(vec![Node::paragraph(vec![])])]),
            Node::row(vec![Node::cell(vec![Node::paragraph(vec![])])]),
        ])
    }

    #[test]
    fn test_engine_creation() {
        let engine = PassEngine::new();
        assert_eq!(engine.pass_names(), vec!["header_rows", "table_separators"]);

        let config = EditorConfig {
            separate_tables: false,
            ..EditorConfig::default()
        };
        assert_eq!(PassEngine::from_config(&config).pass_names(), vec!["header_rows"]);
    }

    #[test]
    fn test_valid_document_needs_no_corrections() {
        let doc = Node::doc(vec![body_table(Node::header_cell), Node::paragraph(vec![])]);
        let scan = DocumentScanner::scan(&doc);

        let edit = PassEngine::new().build_edit(&scan, &EditorConfig::default());
        assert!(edit.is_empty());
    }

    #[test]
    fn test_header_rewrites_come_before_insertions() {
        let doc = Node::doc(vec![body_table(Node::cell), body_table(Node::cell)]);
        let scan = DocumentScanner::scan(&doc);

        let edit = PassEngine::new().build_edit(&scan, &EditorConfig::default());
        let steps = edit.steps();

        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[0], Step::Replace { from: 14, to: 28, .. }));
        assert!(matches!(&steps[1], Step::Replace { from: 0, to: 14, .. }));
        assert!(matches!(&steps[2], Step::Replace { from: 14, to: 14, .. }));
        assert_eq!(edit.meta().origin, EditOrigin::Correction);

        let (fixed, _) = edit.apply(&doc).unwrap();
        assert_eq!(fixed.child_count(), 3);
        assert!(fixed.child(1).unwrap().is_unremovable());
    }
}
