//! Keeps tables from sitting directly next to each other by inserting a
//! protected separator paragraph between any two adjacent sibling tables.

use super::{Correction, CorrectionPass};
use crate::config::EditorConfig;
use crate::scanner::ScanResult;
use cellguard_model::Node;

#[derive(Debug, Default)]
pub struct TableSeparatorPass;

impl CorrectionPass for TableSeparatorPass {
    fn name(&self) -> &'static str {
        "table_separators"
    }

    fn analyze(&self, scan: &ScanResult<'_>, config: &EditorConfig) -> Vec<Correction> {
        scan.tables
            .iter()
            .filter(|table| scan.next_sibling_table(table).is_some())
            .map(|table| {
                tracing::trace!(pos = table.end(), "adjacent tables need a separator");
                Correction::Insert {
                    pos: table.end(),
                    node: Node::separator(&config.separator_placeholder),
                }
            })
            .collect()
    }
}
