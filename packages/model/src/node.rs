//! # Document Nodes
//!
//! Immutable tree values that make up a rich-text document.
//!
//! ## Sizes and positions
//!
//! Every node occupies a number of positions in the flattened document:
//!
//! ```text
//! Text "abc"          → 3   (one per char)
//! HardBreak           → 1
//! Paragraph("abc")    → 5   (open + 3 + close)
//! Table(Row(Cell(P))) → 2 + (2 + (2 + 2))
//! ```
//!
//! The root node's content starts at position `0`, so a document's valid
//! positions are `0..=root.content_size()`.
//!
//! Nodes are never mutated after construction. The `with_*` helpers return a
//! new node and leave the receiver untouched.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Attribute marking a paragraph as a protected table separator
pub const UNREMOVABLE: &str = "unremovable";

/// Closed set of node kinds the engine understands
///
/// Any unrecognized type tag deserializes to [`NodeKind::Other`], which every
/// invariant check ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Doc,
    Table,
    Row,
    HeaderCell,
    Cell,
    Paragraph,
    Text,
    HardBreak,
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Leaf kinds carry no content and have no open/close tokens
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::HardBreak)
    }

    /// Kinds that may directly hold text and hard breaks
    pub fn is_textblock(self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Other)
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Table => "table",
            NodeKind::Row => "row",
            NodeKind::HeaderCell => "header_cell",
            NodeKind::Cell => "cell",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text => "text",
            NodeKind::HardBreak => "hard_break",
            NodeKind::Other => "other",
        }
    }
}

/// Attribute value (hashable, so whole trees can be hashed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

pub type Attrs = BTreeMap<String, AttrValue>;

/// Inline formatting applied to a text node (bold, link, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }
}

/// Immutable document tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    kind: NodeKind,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Node {
    /// Create a container node of any kind
    pub fn new(kind: NodeKind, content: Vec<Node>) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
            marks: Vec::new(),
            content,
            text: None,
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc, content)
    }

    pub fn table(rows: Vec<Node>) -> Self {
        Self::new(NodeKind::Table, rows)
    }

    pub fn row(cells: Vec<Node>) -> Self {
        Self::new(NodeKind::Row, cells)
    }

    pub fn header_cell(content: Vec<Node>) -> Self {
        Self::new(NodeKind::HeaderCell, content)
    }

    pub fn cell(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Cell, content)
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, content)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            marks: Vec::new(),
            content: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Soft line break: renders as a newline without starting a new block
    pub fn hard_break() -> Self {
        Self::new(NodeKind::HardBreak, Vec::new())
    }

    /// Protected separator paragraph placed between two adjacent tables
    pub fn separator(placeholder: &str) -> Self {
        Self::paragraph(vec![Self::text(placeholder)]).with_attr(UNREMOVABLE, true)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// Text of a text node (`None` for every other kind)
    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_unremovable(&self) -> bool {
        matches!(self.attrs.get(UNREMOVABLE), Some(AttrValue::Bool(true)))
    }

    /// Copy of this node with a different kind; attrs, marks and content carry over
    pub fn with_kind(&self, kind: NodeKind) -> Node {
        Node {
            kind,
            ..self.clone()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Node {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_attrs(&self, attrs: Attrs) -> Node {
        Node {
            attrs,
            ..self.clone()
        }
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Node {
        self.marks = marks;
        self
    }

    /// Copy of this node with the same markup and new children
    pub fn with_content(&self, content: Vec<Node>) -> Node {
        Node {
            kind: self.kind,
            attrs: self.attrs.clone(),
            marks: self.marks.clone(),
            content,
            text: self.text.clone(),
        }
    }

    /// Copy of a text node with new text and the same marks
    pub fn with_text(&self, text: impl Into<String>) -> Node {
        Node {
            text: Some(text.into()),
            ..self.clone()
        }
    }

    /// Copy of this node with child `index` swapped out
    pub fn replace_child(&self, index: usize, child: Node) -> Node {
        let mut content = self.content.clone();
        content[index] = child;
        self.with_content(content)
    }

    /// Same kind, attributes and marks (content ignored)
    pub fn same_markup(&self, other: &Node) -> bool {
        self.kind == other.kind && self.attrs == other.attrs && self.marks == other.marks
    }

    /// Number of positions this node occupies in its parent
    pub fn size(&self) -> usize {
        match self.kind {
            NodeKind::Text => self.text.as_deref().map_or(0, |t| t.chars().count()),
            NodeKind::HardBreak => 1,
            _ => 2 + self.content_size(),
        }
    }

    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::size).sum()
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.content.iter().map(Node::text_content).collect(),
        }
    }

    /// The outermost node starting at `pos` (relative to this node's content)
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut offset = 0;
        for child in &self.content {
            let end = offset + child.size();
            if pos == offset && end > offset {
                return Some(child);
            }
            if pos < end {
                if child.is_leaf() {
                    return None;
                }
                return child.node_at(pos - offset - 1);
            }
            offset = end;
        }
        None
    }

    /// Text slice by char offsets, keeping marks
    pub(crate) fn cut_text(&self, from: usize, to: usize) -> Node {
        let text: String = self
            .as_text()
            .unwrap_or_default()
            .chars()
            .skip(from)
            .take(to.saturating_sub(from))
            .collect();
        self.with_text(text)
    }

    /// Hash of kind, attributes, marks, text and children
    pub fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
