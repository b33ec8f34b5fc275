//! # Separator Guard
//!
//! Pre-commit veto for edits that would remove a protected separator while it
//! still separates two tables.
//!
//! The decision is made on the *resulting* document: for every separator that
//! sits between two tables in the old document, the guard maps the separator
//! and both neighbouring tables through the edit's mapping and looks at what
//! is there afterwards.
//!
//! - Separator still present and still protected → fine
//! - Separator gone (or its flag cleared) but one of the tables went with it → fine
//! - Separator gone and both tables still present → veto

use crate::classify::{is_protected_separator, is_table};
use crate::scanner::{ScanEntry, ScanResult};
use cellguard_model::{Assoc, Mapping, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Accept,
    Veto {
        /// Position of the separator in the old document
        separator_pos: usize,
    },
}

pub struct SeparatorGuard;

impl SeparatorGuard {
    pub fn check(old_scan: &ScanResult<'_>, new_root: &Node, mapping: &Mapping) -> GuardVerdict {
        for sandwich in old_scan.sandwiched_separators() {
            if separator_remains(sandwich.separator, new_root, mapping) {
                continue;
            }

            let before = table_remains(sandwich.before, new_root, mapping);
            let after = table_remains(sandwich.after, new_root, mapping);
            if before && after {
                tracing::debug!(
                    pos = sandwich.separator.pos,
                    "vetoing edit that removes a separator between two tables"
                );
                return GuardVerdict::Veto {
                    separator_pos: sandwich.separator.pos,
                };
            }

            tracing::trace!(
                pos = sandwich.separator.pos,
                "separator released together with a neighbouring table"
            );
        }

        GuardVerdict::Accept
    }
}

/// A protected separator still starts where the old one maps to
fn separator_remains(entry: &ScanEntry<'_>, new_root: &Node, mapping: &Mapping) -> bool {
    let pos = mapping.map(entry.pos, Assoc::After);
    new_root.node_at(pos).is_some_and(is_protected_separator)
}

/// The table was not removed as a whole and is still a table of the mapped size
fn table_remains(entry: &ScanEntry<'_>, new_root: &Node, mapping: &Mapping) -> bool {
    let Some((from, to)) = mapping.map_span(entry.pos, entry.end()) else {
        return false;
    };
    new_root
        .node_at(from)
        .is_some_and(|node| is_table(node) && node.size() == to - from)
}
