//! # Cellguard Editor
//!
//! Structural-invariant engine for rich-text documents that contain tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host surface: keys, paste, commands         │
//! └─────────────────────────────────────────────┘
//!                     ↓  Edit
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditPipeline                        │
//! │  - CellInputInterceptor (escape, soft break)│
//! │  - SeparatorGuard (veto)                    │
//! │  - DocumentScanner (one walk)               │
//! │  - HeaderRowPass + TableSeparatorPass       │
//! └─────────────────────────────────────────────┘
//!                     ↓  committed Node + Mapping
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: live snapshot, selection, undo │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! Every committed document satisfies:
//!
//! 1. Row 0 of every table holds only header cells; later rows only plain cells
//! 2. No table is a direct sibling of another table without a protected
//!    separator paragraph between them
//! 3. A separator between two tables is never removed while both tables remain
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cellguard_editor::{EditPipeline, Outcome};
//! use cellguard_model::{Edit, Node};
//!
//! let pipeline = EditPipeline::default();
//! match pipeline.propose(&doc, Edit::new().delete(from, to))? {
//!     Outcome::Committed { doc, mapping } => { /* swap in doc, map selection */ }
//!     Outcome::Vetoed => { /* nothing changes */ }
//! }
//! ```

pub mod classify;
mod config;
mod errors;
mod guard;
mod input;
pub mod passes;
mod pipeline;
mod scanner;
mod session;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::EditorError;
pub use guard::{GuardVerdict, SeparatorGuard};
pub use input::{
    cell_start, CaretContext, CellInputInterceptor, InputContext, InsertTarget, Key, Modifiers,
};
pub use passes::{Correction, CorrectionPass, HeaderRowPass, PassEngine, TableSeparatorPass};
pub use pipeline::{propose_edit, EditPipeline, Outcome};
pub use scanner::{DocumentScanner, Sandwich, ScanEntry, ScanResult};
pub use session::{EditSession, KeyOutcome, Selection};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export model types for convenience
pub use cellguard_model::{Edit, EditOrigin, Mapping, Node, NodeKind};
