//! # Edit Pipeline
//!
//! Runs a proposed edit through every stage before anything becomes visible:
//!
//! ```text
//! Proposed ──▶ CellInputInterceptor (may rewrite typed/pasted text)
//!    │
//!    ├──▶ apply to a candidate document (stale or out-of-range → error)
//!    │
//!    ├──▶ SeparatorGuard ──veto──▶ Vetoed (document unchanged)
//!    │
//!    ├──▶ DocumentScanner (once) ──▶ HeaderRowPass + TableSeparatorPass
//!    │
//!    └──▶ Committed (edit + corrections as one document and one mapping)
//! ```
//!
//! Each stage runs once per proposal, so a proposal always terminates. The
//! passes are idempotent, which means the committed document never needs a
//! second round of corrections.

use crate::config::EditorConfig;
use crate::guard::{GuardVerdict, SeparatorGuard};
use crate::input::CellInputInterceptor;
use crate::passes::PassEngine;
use crate::scanner::DocumentScanner;
use crate::EditorError;
use cellguard_model::{Edit, Mapping, Node};

/// Result of proposing an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rejected by the guard; the document is unchanged
    Vetoed,

    Committed {
        doc: Node,
        /// Old document positions → committed document positions
        mapping: Mapping,
    },
}

impl Outcome {
    pub fn is_vetoed(&self) -> bool {
        matches!(self, Outcome::Vetoed)
    }
}

/// Runs the full propose → veto → apply → correct → commit sequence
#[derive(Debug)]
pub struct EditPipeline {
    config: EditorConfig,
    interceptor: CellInputInterceptor,
    engine: PassEngine,
}

impl EditPipeline {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            interceptor: CellInputInterceptor::new(&config),
            engine: PassEngine::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn interceptor(&self) -> &CellInputInterceptor {
        &self.interceptor
    }

    /// Propose `edit` against `doc`
    ///
    /// `doc` is never modified. A vetoed edit is a normal outcome, not an error;
    /// errors only report edits that do not fit `doc` at all.
    pub fn propose(&self, doc: &Node, edit: Edit) -> Result<Outcome, EditorError> {
        let edit = self.interceptor.rewrite_edit(doc, edit);

        let (applied, mut mapping) = edit.apply(doc)?;

        if self.config.protect_separators {
            let old_scan = DocumentScanner::scan(doc);
            if let GuardVerdict::Veto { separator_pos } =
                SeparatorGuard::check(&old_scan, &applied, &mapping)
            {
                tracing::debug!(separator_pos, "edit vetoed");
                return Ok(Outcome::Vetoed);
            }
        }

        let corrections = {
            let scan = DocumentScanner::scan(&applied);
            self.engine.build_edit(&scan, &self.config)
        };

        if corrections.is_empty() {
            tracing::debug!(steps = edit.steps().len(), "edit committed");
            return Ok(Outcome::Committed {
                doc: applied,
                mapping,
            });
        }

        let (corrected, correction_mapping) = corrections
            .apply(&applied)
            .map_err(EditorError::Correction)?;
        mapping.append(&correction_mapping);

        tracing::debug!(
            steps = edit.steps().len(),
            corrections = corrections.steps().len(),
            "edit committed with corrections"
        );
        Ok(Outcome::Committed {
            doc: corrected,
            mapping,
        })
    }
}

impl Default for EditPipeline {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// Propose an edit with the default configuration
pub fn propose_edit(doc: &Node, edit: Edit) -> Result<Outcome, EditorError> {
    EditPipeline::default().propose(doc, edit)
}
