//! Tag handlers: the built-in fallback table and the user extension point.

use super::dom::Element;
use super::{HtmlParser, ParseContext};
use crate::model::{AttributeMap, Node, NodeKind, StyleMap};
use serde_json::json;

/// Everything the parser resolved for an element before its handler runs.
#[derive(Debug, Clone)]
pub struct ElementInput {
    /// Lower-cased tag name
    pub tag: String,
    /// Layered styles: tag defaults < call-site < inline `style`
    pub styles: StyleMap,
    /// Layered attributes: call-site < element
    pub attributes: AttributeMap,
    /// Text of a sole text child (the element was not recursed into)
    pub text: Option<String>,
    /// Parsed, fragment-flattened children
    pub content: Vec<Node>,
    /// List nesting level, set for `ul`, `ol` and `li`
    pub level: Option<usize>,
    /// Context the children were parsed with
    pub context: ParseContext,
}

impl ElementInput {
    /// Build a node of `kind` carrying this element's text, styles, attributes and content.
    pub fn into_node(self, kind: NodeKind) -> Node {
        Node {
            kind,
            text: self.text,
            styles: self.styles,
            attributes: self.attributes,
            metadata: Default::default(),
            content: self.content,
        }
    }
}

/// Converts one element into an element tree node.
///
/// Closures with the matching signature are handlers:
///
/// ```
/// use htmldoc::model::{Node, NodeKind};
/// use htmldoc::parser::{Element, ElementInput, HtmlParser};
///
/// let mut parser = HtmlParser::new();
/// parser
///     .register_tag_handler("note", |input: ElementInput, _: &Element, _: &HtmlParser| {
///         input.into_node(NodeKind::Paragraph).with_style("fontStyle", "italic")
///     })
///     .unwrap();
/// let nodes = parser.parse("<note>Careful</note>");
/// assert_eq!(nodes[0].kind, NodeKind::Paragraph);
/// ```
pub trait TagHandler: Send + Sync {
    /// Build the node for `element`.
    ///
    /// `parser` can be used to re-parse `element.children` with a
    /// different context.
    fn handle(&self, input: ElementInput, element: &Element, parser: &HtmlParser) -> Node;
}

impl<F> TagHandler for F
where
    F: Fn(ElementInput, &Element, &HtmlParser) -> Node + Send + Sync,
{
    fn handle(&self, input: ElementInput, element: &Element, parser: &HtmlParser) -> Node {
        self(input, element, parser)
    }
}

/// Tags whose subtree is never converted.
pub(crate) const IGNORED_TAGS: &[&str] = &[
    "head", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Tags whose text keeps its whitespace.
pub(crate) const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea", "listing", "plaintext"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "form", "main", "nav", "p", "pre", "section",
    "summary", "textarea",
];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "del", "dfn", "em", "font", "i", "ins",
    "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup",
    "time", "u", "var",
];

/// Run the built-in handler for `input.tag`.
pub(crate) fn builtin(input: ElementInput) -> Node {
    let tag = input.tag.as_str();
    match tag {
        "html" => input.into_node(NodeKind::Fragment),
        "body" => input.into_node(NodeKind::Page),
        "header" => input.into_node(NodeKind::Header),
        "footer" => input.into_node(NodeKind::Footer),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => heading(input),
        "br" => Node::line_break(),
        "hr" => input.into_node(NodeKind::Line),
        "img" => input.into_node(NodeKind::Image),
        "ul" | "ol" => list(input),
        "li" => list_item(input),
        "table" => table(input),
        "thead" | "tbody" | "tfoot" => input.into_node(NodeKind::Fragment),
        "tr" => table_row(input),
        "td" | "th" => table_cell(input),
        "caption" | "colgroup" | "col" => attribute(input),
        t if BLOCK_TAGS.contains(&t) => input.into_node(NodeKind::Paragraph),
        t if INLINE_TAGS.contains(&t) => inline(input),
        _ => {
            log::debug!("Unknown tag <{}> mapped to custom", tag);
            input.into_node(NodeKind::Custom)
        }
    }
}

/// Inline formatting: a text run when it wraps plain text, else a fragment
/// that hands its styles and attributes down to its children.
fn inline(input: ElementInput) -> Node {
    if input.content.is_empty() && input.text.is_some() {
        return input.into_node(NodeKind::Text);
    }
    input.into_node(NodeKind::Fragment)
}

fn heading(input: ElementInput) -> Node {
    let level = input.tag[1..].parse::<u8>().unwrap_or(1);
    input.into_node(NodeKind::Heading { level })
}

fn list(input: ElementInput) -> Node {
    let ordered = input.tag == "ol";
    let level = input.level.unwrap_or(0);
    let mut node = input.into_node(NodeKind::List { ordered });
    node.content.retain(|c| !is_blank_text(c));
    node.with_metadata("level", json!(level))
}

fn list_item(input: ElementInput) -> Node {
    let level = input.level.unwrap_or(0);
    input
        .into_node(NodeKind::ListItem)
        .with_metadata("level", json!(level))
}

/// Keeps rows (from direct children and transparent row groups, in source
/// order) and `attribute` children for hoisting; drops anything else.
fn table(input: ElementInput) -> Node {
    let mut node = input.into_node(NodeKind::Table);
    node.content.retain(|child| match child.kind {
        NodeKind::TableRow | NodeKind::Attribute { .. } => true,
        _ => {
            if !is_blank_text(child) {
                log::debug!("Dropping non-row table child {:?}", child.kind);
            }
            false
        }
    });
    node
}

fn table_row(input: ElementInput) -> Node {
    let mut node = input.into_node(NodeKind::TableRow);
    node.content
        .retain(|child| matches!(child.kind, NodeKind::TableCell { .. }));
    node
}

fn table_cell(input: ElementInput) -> Node {
    let header = input.tag == "th";
    input.into_node(NodeKind::TableCell { header })
}

fn attribute(input: ElementInput) -> Node {
    let name = input.tag.clone();
    input.into_node(NodeKind::Attribute { name })
}

fn is_blank_text(node: &Node) -> bool {
    node.kind == NodeKind::Text
        && node.content.is_empty()
        && node.text.as_deref().map_or(true, |t| t.trim().is_empty())
        && !node.is_line_break()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tag: &str) -> ElementInput {
        ElementInput {
            tag: tag.to_string(),
            styles: StyleMap::new(),
            attributes: AttributeMap::new(),
            text: None,
            content: Vec::new(),
            level: None,
            context: ParseContext::default(),
        }
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(builtin(input("h3")).kind, NodeKind::Heading { level: 3 });
    }

    #[test]
    fn test_inline_with_text_is_run() {
        let mut i = input("strong");
        i.text = Some("x".to_string());
        let node = builtin(i);
        assert_eq!(node.kind, NodeKind::Text);
        assert_eq!(node.text.as_deref(), Some("x"));
    }

    #[test]
    fn test_inline_with_children_is_fragment() {
        let mut i = input("em");
        i.content = vec![Node::text("a"), Node::text("b")];
        assert_eq!(builtin(i).kind, NodeKind::Fragment);
    }

    #[test]
    fn test_unknown_tag_is_custom() {
        let mut i = input("x-widget");
        i.content = vec![Node::text("kept")];
        let node = builtin(i);
        assert_eq!(node.kind, NodeKind::Custom);
        assert_eq!(node.plain_text(), "kept");
    }

    #[test]
    fn test_row_keeps_only_cells() {
        let mut i = input("tr");
        i.content = vec![
            Node::text(" "),
            Node::new(NodeKind::TableCell { header: false }),
        ];
        assert_eq!(builtin(i).content.len(), 1);
    }

    #[test]
    fn test_list_level_metadata() {
        let mut i = input("ol");
        i.level = Some(2);
        let node = builtin(i);
        assert_eq!(node.kind, NodeKind::List { ordered: true });
        assert_eq!(node.level(), Some(2));
    }
}
