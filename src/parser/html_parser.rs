//! HTML to element tree parser.

use rayon::prelude::*;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::error::Result;
use crate::model::{layered, AttributeMap, Node, NodeKind, StyleMap, StyleValue};

use super::css::parse_inline_style;
use super::dom::{DomNode, Element};
use super::handlers::{self, ElementInput, TagHandler, IGNORED_TAGS, PREFORMATTED_TAGS};
use super::options::ParseOptions;

/// Attributes parsed as integer spans (minimum 1).
const SPAN_ATTRIBUTES: &[&str] = &["colspan", "rowspan", "span"];

/// Values threaded from a parent element into the parsing of its children.
///
/// `styles` and `attributes` are call-site values layered between the tag
/// defaults and the element's own values; they apply to direct children
/// only. `list_level` and `preserve_whitespace` flow to all descendants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseContext {
    /// Call-site styles for the children
    pub styles: StyleMap,
    /// Call-site attributes for the children
    pub attributes: AttributeMap,
    /// Level of the innermost enclosing list, if any
    pub list_level: Option<usize>,
    /// Whether text keeps its whitespace
    pub preserve_whitespace: bool,
}

impl ParseContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call-site styles and return self.
    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = styles;
        self
    }

    /// Set the call-site attributes and return self.
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the list level and return self.
    pub fn with_list_level(mut self, level: usize) -> Self {
        self.list_level = Some(level);
        self
    }

    /// Context for the descendants of an element: keeps the threaded
    /// values, drops the call-site ones.
    fn descend(&self) -> Self {
        Self {
            styles: StyleMap::new(),
            attributes: AttributeMap::new(),
            list_level: self.list_level,
            preserve_whitespace: self.preserve_whitespace,
        }
    }
}

/// HTML parser producing the intermediate element tree.
///
/// Parsing never fails: unknown tags become `custom` nodes, malformed
/// markup is repaired by the DOM collaborator and empty input yields an
/// empty tree.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser {
    options: ParseOptions,
}

impl HtmlParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Get the parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Register a handler for `tag` (case-insensitive); last registration wins.
    pub fn register_tag_handler(
        &mut self,
        tag: &str,
        handler: impl TagHandler + 'static,
    ) -> Result<()> {
        self.options.register_tag_handler(tag, handler)
    }

    /// Parse HTML into top-level element tree nodes, in document order.
    pub fn parse(&self, html: &str) -> Vec<Node> {
        if html.trim().is_empty() {
            return Vec::new();
        }
        let document = self.options.dom_parser().parse(html);
        let ctx = ParseContext::new();

        let nodes = if self.options.parallel && document.children.len() > 1 {
            let parsed: Vec<Vec<Node>> = document
                .children
                .par_iter()
                .map(|child| self.parse_children(std::slice::from_ref(child), &ctx))
                .collect();
            parsed.into_iter().flatten().collect()
        } else {
            self.parse_children(&document.children, &ctx)
        };

        nodes
            .into_iter()
            .filter(|node| {
                let keep = !matches!(node.kind, NodeKind::Attribute { .. });
                if !keep {
                    log::trace!("Dropping top-level attribute node");
                }
                keep
            })
            .collect()
    }

    /// Parse sibling DOM nodes with `ctx`, flattening fragments.
    pub fn parse_children(&self, children: &[DomNode], ctx: &ParseContext) -> Vec<Node> {
        let mut parsed = Vec::with_capacity(children.len());
        for child in children {
            match child {
                DomNode::Text(raw) => {
                    if let Some(text) = self.normalize_text(raw, ctx) {
                        parsed.push(Node::text(text));
                    }
                }
                DomNode::Element(element) => parsed.push(self.parse_element(element, ctx)),
            }
        }
        flatten_fragments(parsed)
    }

    /// Parse one element with `ctx`.
    ///
    /// The result may be a fragment; callers that need a flat list should
    /// go through [`parse_children`](Self::parse_children).
    pub fn parse_element(&self, element: &Element, ctx: &ParseContext) -> Node {
        let tag = element.tag.as_str();
        if IGNORED_TAGS.contains(&tag) {
            return Node::new(NodeKind::Fragment);
        }

        let empty = StyleMap::new();
        let defaults = self.options.default_styles(tag).unwrap_or(&empty);
        let inline = element
            .attribute("style")
            .map(parse_inline_style)
            .unwrap_or_default();
        let styles = layered(&[defaults, &ctx.styles, &inline]);
        let attributes = layered(&[&ctx.attributes, &element_attributes(element)]);

        let level = match tag {
            "ul" | "ol" => Some(ctx.list_level.map_or(0, |l| l + 1)),
            "li" => Some(ctx.list_level.unwrap_or(0)),
            _ => None,
        };
        let mut child_ctx = ctx.descend();
        if level.is_some() {
            child_ctx.list_level = level;
        }
        if PREFORMATTED_TAGS.contains(&tag) || is_preformatted(&styles) {
            child_ctx.preserve_whitespace = true;
        }

        let mut content = self.parse_children(&element.children, &child_ctx);
        let mut text = None;
        let sole_text = tag != "div"
            && element.has_only_text()
            && content.len() == 1
            && content[0].kind == NodeKind::Text;
        if sole_text {
            text = content.pop().and_then(|node| node.text);
        }

        let input = ElementInput {
            tag: tag.to_string(),
            styles,
            attributes,
            text,
            content,
            level,
            context: child_ctx,
        };
        let mut node = match self.options.handler(tag) {
            Some(handler) => handler.handle(input, element, self),
            None => handlers::builtin(input),
        };

        node.metadata
            .entry("tagName".to_string())
            .or_insert_with(|| json!(tag));
        hoist_attributes(&mut node);
        node
    }

    fn normalize_text(&self, raw: &str, ctx: &ParseContext) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        if ctx.preserve_whitespace || !self.options.collapse_whitespace {
            return Some(raw.to_string());
        }
        if raw.trim().is_empty() && raw.contains('\n') {
            return None;
        }
        Some(collapse_whitespace(raw))
    }
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\r\n\x0C]+").unwrap())
}

/// Collapse runs of ASCII whitespace to one space; non-breaking spaces are kept.
pub fn collapse_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").into_owned()
}

fn is_preformatted(styles: &StyleMap) -> bool {
    matches!(
        styles.get("whiteSpace").and_then(|v| v.as_str()),
        Some("pre" | "pre-wrap")
    )
}

fn element_attributes(element: &Element) -> AttributeMap {
    element
        .attributes
        .iter()
        .filter(|(key, _)| key != "style")
        .map(|(key, value)| {
            let value = if SPAN_ATTRIBUTES.contains(&key.as_str()) {
                StyleValue::from(StyleValue::Str(value.clone()).as_span())
            } else if key == "start" {
                value
                    .trim()
                    .parse::<f64>()
                    .map(StyleValue::Number)
                    .unwrap_or_else(|_| StyleValue::Str(value.clone()))
            } else {
                StyleValue::Str(value.clone())
            };
            (key.clone(), value)
        })
        .collect()
}

/// Replace fragments by their children, recursively.
///
/// A fragment's styles and attributes are layered underneath each child's
/// own. A fragment with text but no children becomes a text run.
pub fn flatten_fragments(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    flatten_into(nodes, &mut out);
    out
}

fn flatten_into(nodes: Vec<Node>, out: &mut Vec<Node>) {
    for node in nodes {
        if node.kind != NodeKind::Fragment {
            out.push(node);
            continue;
        }
        let Node {
            text,
            styles,
            attributes,
            content,
            ..
        } = node;
        if content.is_empty() {
            if let Some(text) = text {
                let mut run = Node::text(text).with_styles(styles);
                run.attributes = attributes;
                out.push(run);
            }
            continue;
        }
        let children = content
            .into_iter()
            .map(|mut child| {
                child.styles = layered(&[&styles, &child.styles]);
                child.attributes = layered(&[&attributes, &child.attributes]);
                child
            })
            .collect();
        flatten_into(children, out);
    }
}

/// Move `attribute` children into `metadata[name]` as descriptor arrays.
pub fn hoist_attributes(node: &mut Node) {
    if !node
        .content
        .iter()
        .any(|c| matches!(c.kind, NodeKind::Attribute { .. }))
    {
        return;
    }
    let content = std::mem::take(&mut node.content);
    for child in content {
        let NodeKind::Attribute { ref name } = child.kind else {
            node.content.push(child);
            continue;
        };
        let name = name.clone();
        let descriptor = match serde_json::to_value(&child) {
            Ok(Value::Object(mut map)) => {
                map.remove("type");
                map.remove("name");
                Value::Object(map)
            }
            Ok(_) | Err(_) => {
                log::warn!("Could not describe attribute node {:?}", name);
                continue;
            }
        };
        match node.metadata.get_mut(&name) {
            Some(Value::Array(items)) => items.push(descriptor),
            _ => {
                node.metadata.insert(name, Value::Array(vec![descriptor]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Vec<Node> {
        HtmlParser::new().parse(html)
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n ").is_empty());
    }

    #[test]
    fn test_paragraph_with_span() {
        let nodes = parse(r#"<p style="font-weight:bold"><span style="color:red">Hello</span>World</p>"#);
        assert_eq!(nodes.len(), 1);
        let p = &nodes[0];
        assert_eq!(p.kind, NodeKind::Paragraph);
        assert_eq!(p.style("fontWeight"), Some("bold"));
        assert_eq!(p.content.len(), 2);
        assert_eq!(p.content[0].kind, NodeKind::Text);
        assert_eq!(p.content[0].text.as_deref(), Some("Hello"));
        assert_eq!(p.content[0].style("color"), Some("red"));
        assert_eq!(p.content[1].text.as_deref(), Some("World"));
        assert!(p.content[1].styles.is_empty());
    }

    #[test]
    fn test_sole_text_child_collapses() {
        let nodes = parse("<p>Only</p><div>Kept</div>");
        assert_eq!(nodes[0].text.as_deref(), Some("Only"));
        assert!(nodes[0].content.is_empty());
        assert!(nodes[1].text.is_none());
        assert_eq!(nodes[1].content[0].text.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_nested_list_levels() {
        let nodes = parse("<ul><li>A<ul><li>B</li></ul></li></ul>");
        let outer = &nodes[0];
        assert_eq!(outer.kind, NodeKind::List { ordered: false });
        assert_eq!(outer.level(), Some(0));
        let item = &outer.content[0];
        assert_eq!(item.kind, NodeKind::ListItem);
        assert_eq!(item.level(), Some(0));
        let inner = &item.content[1];
        assert_eq!(inner.level(), Some(1));
        let inner_item = &inner.content[0];
        assert_eq!(inner_item.level(), Some(1));
        assert_eq!(inner_item.text.as_deref(), Some("B"));
        assert!(item.content[0].metadata.get("level").is_none());
    }

    #[test]
    fn test_fragment_styles_flow_to_children() {
        let nodes = parse("<p><strong>a <em>b</em></strong></p>");
        let p = &nodes[0];
        assert_eq!(p.content.len(), 2);
        assert_eq!(p.content[0].style("fontWeight"), Some("bold"));
        assert_eq!(p.content[1].style("fontWeight"), Some("bold"));
        assert_eq!(p.content[1].style("fontStyle"), Some("italic"));
        assert!(p.content.iter().all(|c| c.kind != NodeKind::Fragment));
    }

    #[test]
    fn test_inline_style_overrides_default() {
        let nodes = parse(r#"<h1 style="font-size: 40px">T</h1>"#);
        assert_eq!(nodes[0].kind, NodeKind::Heading { level: 1 });
        assert_eq!(nodes[0].style("fontSize"), Some("40px"));
        assert_eq!(nodes[0].style("fontWeight"), Some("bold"));
    }

    #[test]
    fn test_whitespace_handling() {
        let nodes = parse("<p>a\n   b</p>\n<pre>x\n  y</pre>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text.as_deref(), Some("a b"));
        assert_eq!(nodes[1].text.as_deref(), Some("x\n  y"));
    }

    #[test]
    fn test_tag_name_metadata() {
        let nodes = parse("<section><b>x</b></section>");
        assert_eq!(nodes[0].tag_name(), Some("section"));
        assert_eq!(nodes[0].content[0].tag_name(), Some("b"));
    }

    #[test]
    fn test_ignored_tags() {
        let nodes = parse("<p>a</p><script>var x = 1;</script><style>p{}</style>");
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_hoist_attributes() {
        let mut node = Node::new(NodeKind::Table).with_content(vec![
            Node::new(NodeKind::Attribute {
                name: "caption".to_string(),
            })
            .with_text("Cap"),
            Node::new(NodeKind::TableRow),
        ]);
        hoist_attributes(&mut node);
        assert_eq!(node.content.len(), 1);
        assert_eq!(node.metadata["caption"], json!([{"text": "Cap"}]));
    }

    #[test]
    fn test_flatten_nested_fragments() {
        let inner = Node::new(NodeKind::Fragment)
            .with_style("color", "red")
            .with_content(vec![Node::text("x").with_style("color", "blue")]);
        let outer = Node::new(NodeKind::Fragment)
            .with_style("fontWeight", "bold")
            .with_content(vec![inner, Node::text("y")]);
        let flat = flatten_fragments(vec![outer]);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].style("color"), Some("blue"));
        assert_eq!(flat[0].style("fontWeight"), Some("bold"));
        assert_eq!(flat[1].style("fontWeight"), Some("bold"));
    }

    #[test]
    fn test_parse_element_with_list_level() {
        let mut li = Element::new("LI");
        li.children.push(DomNode::Text("item".to_string()));

        let ctx = ParseContext::new().with_list_level(2);
        let node = HtmlParser::new().parse_element(&li, &ctx);
        assert_eq!(node.kind, NodeKind::ListItem);
        assert_eq!(node.level(), Some(2));
        assert_eq!(node.text.as_deref(), Some("item"));
        assert_eq!(node.tag_name(), Some("li"));
    }

    #[test]
    fn test_parallel_keeps_order() {
        let html: String = (0..50).map(|i| format!("<p>{}</p>", i)).collect();
        let parser = HtmlParser::with_options(ParseOptions::new().with_parallel(true));
        let nodes = parser.parse(&html);
        let texts: Vec<String> = nodes.iter().map(|n| n.plain_text()).collect();
        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(texts, expected);
    }
}
