//! Error types for the editor

use cellguard_model::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// The proposed edit does not fit the document it was built against
    #[error("Edit precondition failed: {0}")]
    Precondition(#[from] EditError),

    /// A correction pass produced an edit that could not be applied
    #[error("Correction failed: {0}")]
    Correction(EditError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
