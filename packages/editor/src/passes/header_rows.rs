//! Header row normalization: row 0 of every table holds only header cells,
//! every later row holds only plain cells.
//!
//! Only the kind tag changes. Attributes, marks and content of each cell are
//! carried over as they are, so a rebuilt table has exactly the size of the
//! original and no position inside it moves.

use super::{Correction, CorrectionPass};
use crate::classify::{is_any_cell, is_row, is_table};
use crate::config::EditorConfig;
use crate::scanner::ScanResult;
use cellguard_model::{Node, NodeKind};

#[derive(Debug, Default)]
pub struct HeaderRowPass;

impl CorrectionPass for HeaderRowPass {
    fn name(&self) -> &'static str {
        "header_rows"
    }

    fn analyze(&self, scan: &ScanResult<'_>, _config: &EditorConfig) -> Vec<Correction> {
        let mut corrections = Vec::new();
        // End of the last rebuilt table; tables nested inside it are already fixed
        let mut covered_until = 0;

        for entry in &scan.tables {
            if entry.pos < covered_until {
                continue;
            }
            if let Some(rebuilt) = normalize_table(entry.node) {
                tracing::trace!(pos = entry.pos, "table header rows need rebuilding");
                corrections.push(Correction::Replace {
                    from: entry.pos,
                    to: entry.end(),
                    node: rebuilt,
                });
                covered_until = entry.end();
            }
        }

        corrections
    }
}

/// Rebuild `table` with normalized header rows, or `None` if it is already valid
///
/// Tables nested inside cells are normalized as part of the rebuild.
pub fn normalize_table(table: &Node) -> Option<Node> {
    let mut row_index = 0;
    rebuild_children(table, |child| {
        if !is_row(child) {
            return normalize_nested(child);
        }
        let want = if row_index == 0 {
            NodeKind::HeaderCell
        } else {
            NodeKind::Cell
        };
        row_index += 1;
        normalize_row(child, want)
    })
}

fn normalize_row(row: &Node, want: NodeKind) -> Option<Node> {
    rebuild_children(row, |cell| {
        let inner = normalize_nested(cell);
        if !is_any_cell(cell) || cell.kind() == want {
            return inner;
        }
        Some(inner.as_ref().unwrap_or(cell).with_kind(want))
    })
}

fn normalize_nested(node: &Node) -> Option<Node> {
    if is_table(node) {
        return normalize_table(node);
    }
    if node.is_leaf() {
        return None;
    }
    rebuild_children(node, normalize_nested)
}

/// Apply `f` to each child; rebuild the node only if some child changed
fn rebuild_children(node: &Node, mut f: impl FnMut(&Node) -> Option<Node>) -> Option<Node> {
    let mut changed = false;
    let content: Vec<Node> = node
        .content()
        .iter()
        .map(|child| match f(child) {
            Some(rebuilt) => {
                changed = true;
                rebuilt
            }
            None => child.clone(),
        })
        .collect();

    changed.then(|| node.with_content(content))
}
