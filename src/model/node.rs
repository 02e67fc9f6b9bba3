//! Element tree nodes.

use super::style::{AttributeMap, Scope, StyleMap, StyleValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Side-channel data attached to a node (tag name, list level, hoisted descriptors).
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// The kind of an element tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    /// Paragraph-like block container
    Paragraph,
    /// Heading with level 1-6
    Heading {
        /// Heading level
        level: u8,
    },
    /// Text run
    Text,
    /// Image reference
    Image,
    /// Ordered or unordered list
    List {
        /// Whether items are numbered
        ordered: bool,
    },
    /// List item
    ListItem,
    /// Table container
    Table,
    /// Table row
    TableRow,
    /// Table cell
    TableCell {
        /// Whether this is a header cell
        header: bool,
    },
    /// Horizontal rule
    Line,
    /// Page (document body)
    Page,
    /// Page header
    Header,
    /// Page footer
    Footer,
    /// Pass-through grouping, flattened away during parsing
    Fragment,
    /// Non-renderable descriptor hoisted into the parent's metadata
    Attribute {
        /// Metadata key the descriptor is hoisted under
        name: String,
    },
    /// Unrecognized markup
    Custom,
}

/// A node of the intermediate element tree.
///
/// A node with non-empty `content` is a container; text leaves carry
/// `text` and never `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node kind
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Text content for leaves and collapsed single-text elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Resolved raw styles (camelCase keys)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: StyleMap,

    /// Element attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: AttributeMap,

    /// Side-channel metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
}

impl Node {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            styles: StyleMap::new(),
            attributes: AttributeMap::new(),
            metadata: Metadata::new(),
            content: Vec::new(),
        }
    }

    /// Create a text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text).with_text(text)
    }

    /// Create an explicit line break marker.
    pub fn line_break() -> Self {
        Self::text("\n")
    }

    /// Create a paragraph holding the given children.
    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph).with_content(content)
    }

    /// Set the text and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set one style and return self.
    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    /// Replace the styles and return self.
    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = styles;
        self
    }

    /// Set one attribute and return self.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set one metadata entry and return self.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Replace the children and return self.
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Check if this node is a container.
    pub fn is_container(&self) -> bool {
        !self.content.is_empty()
    }

    /// Check if this node renders inline (text runs and images).
    pub fn is_inline(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::Image)
    }

    /// Check if this node is an explicit line break.
    pub fn is_line_break(&self) -> bool {
        self.kind == NodeKind::Text && self.text.as_deref() == Some("\n")
    }

    /// Check if this node is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        self.kind == NodeKind::Paragraph
    }

    /// Get the style scope this node belongs to.
    pub fn scope(&self) -> Scope {
        match self.kind {
            NodeKind::Text | NodeKind::Image => Scope::Inline,
            NodeKind::Table => Scope::Table,
            NodeKind::TableRow => Scope::TableRow,
            NodeKind::TableCell { .. } => Scope::TableCell,
            _ => Scope::Block,
        }
    }

    /// Get the source tag name recorded by the parser.
    pub fn tag_name(&self) -> Option<&str> {
        self.metadata.get("tagName").and_then(|v| v.as_str())
    }

    /// Get the list nesting level recorded by the parser.
    pub fn level(&self) -> Option<usize> {
        self.metadata
            .get("level")
            .and_then(|v| v.as_u64())
            .map(|l| l as usize)
    }

    /// Get an attribute as a string.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).map(|v| v.to_string())
    }

    /// Get a raw style value as a string.
    pub fn style(&self, key: &str) -> Option<&str> {
        self.styles.get(key).and_then(|v| v.as_str())
    }

    /// Get plain text content, concatenating all descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Iterate direct children of the given kind.
    pub fn children_of<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a Node> + 'a {
        self.content.iter().filter(move |c| &c.kind == kind)
    }
}
