use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "cellguard.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Character that breaks the external table syntax when typed in a cell
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// What the delimiter is rewritten to inside cells
    #[serde(default = "default_delimiter_replacement")]
    pub delimiter_replacement: char,

    /// Text placed inside generated separator paragraphs
    #[serde(default = "default_separator_placeholder")]
    pub separator_placeholder: String,

    // The three switches below are for diagnostics only. Turning one off lets
    // commits break the invariant it guards.
    /// Run the header row pass (row 0 all headers, later rows plain)
    #[serde(default = "default_true")]
    pub normalize_headers: bool,

    /// Run the separator pass between adjacent tables
    #[serde(default = "default_true")]
    pub separate_tables: bool,

    /// Veto edits that drop a separator between two remaining tables
    #[serde(default = "default_true")]
    pub protect_separators: bool,

    #[serde(default = "default_true")]
    pub soft_break_on_enter: bool,

    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

fn default_delimiter() -> char {
    '|'
}

fn default_delimiter_replacement() -> char {
    '/'
}

fn default_separator_placeholder() -> String {
    "\u{200B}".to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_depth() -> usize {
    100
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults if no file exists
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            delimiter_replacement: default_delimiter_replacement(),
            separator_placeholder: default_separator_placeholder(),
            normalize_headers: true,
            separate_tables: true,
            protect_separators: true,
            soft_break_on_enter: true,
            history_depth: default_history_depth(),
        }
    }
}
