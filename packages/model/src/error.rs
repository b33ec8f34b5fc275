//! Error types for the document model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Position {pos} is outside the document (content size {size})")]
    OutOfBounds { pos: usize, size: usize },

    #[error("Invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("No node starts at position {0}")]
    NoNodeAt(usize),

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}
