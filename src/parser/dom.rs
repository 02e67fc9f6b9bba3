//! DOM collaborator.
//!
//! The element walk works on a small owned tree so that tag handlers and
//! parallel parsing never hold on to the HTML parser's arena. Comments,
//! doctypes and processing instructions do not survive the conversion.

use crate::detect;
use ego_tree::NodeRef;
use scraper::{Html, Selector};

/// An element with lower-cased tag name and attribute keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name
    pub tag: String,
    /// Attributes in source order
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<DomNode>,
}

impl Element {
    /// Create an element without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by (lower-case) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check if all children are text.
    pub fn has_only_text(&self) -> bool {
        self.children
            .iter()
            .all(|c| matches!(c, DomNode::Text(_)))
    }
}

/// A DOM node: element or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    /// Element node
    Element(Element),
    /// Raw text node
    Text(String),
}

/// A parsed HTML input: the top-level nodes to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes (the `<body>` children for full documents)
    pub children: Vec<DomNode>,
}

/// Turns HTML text into a [`Document`].
///
/// Implementations must tolerate malformed and unclosed markup.
pub trait DomParser: Send + Sync {
    /// Parse HTML into a document.
    fn parse(&self, html: &str) -> Document;
}

/// Default DOM parser backed by `scraper` (html5ever).
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperDomParser;

impl DomParser for ScraperDomParser {
    fn parse(&self, html: &str) -> Document {
        if detect::is_full_document(html) {
            let document = Html::parse_document(html);
            let body = Selector::parse("body")
                .ok()
                .and_then(|selector| document.select(&selector).next());
            let children = match body {
                Some(body) => convert_children(*body),
                None => convert_children(document.tree.root()),
            };
            return Document { children };
        }

        let fragment = Html::parse_fragment(html);
        Document {
            children: convert_children(*fragment.root_element()),
        }
    }
}

fn convert_children(node: NodeRef<'_, scraper::Node>) -> Vec<DomNode> {
    node.children().filter_map(convert_node).collect()
}

fn convert_node(node: NodeRef<'_, scraper::Node>) -> Option<DomNode> {
    match node.value() {
        scraper::Node::Text(text) => Some(DomNode::Text(String::from(&**text))),
        scraper::Node::Element(el) => Some(DomNode::Element(Element {
            tag: el.name().to_ascii_lowercase(),
            attributes: el
                .attrs()
                .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
                .collect(),
            children: convert_children(node),
        })),
        _ => None,
    }
}
