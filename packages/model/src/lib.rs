//! # Cellguard Model
//!
//! The document representation the editing engine works against: an
//! immutable node tree addressed by flat integer positions, edits made of
//! range-replacing steps, and mappings that carry positions across edits.
//!
//! ```text
//! Node tree ──Edit::apply──▶ new Node tree
//!                  │
//!                  └──▶ Mapping (old positions → new positions)
//! ```

pub mod edit;
pub mod error;
pub mod mapping;
pub mod node;
pub mod position;
pub mod visitor;

pub use edit::{Edit, EditMeta, EditOrigin, Step};
pub use error::EditError;
pub use mapping::{Assoc, MapResult, Mapping, StepMap};
pub use node::{AttrValue, Attrs, Mark, Node, NodeKind, UNREMOVABLE};
pub use position::{Level, ResolvedPos};
pub use visitor::{walk_document, walk_node, NodeContext, Visitor};
