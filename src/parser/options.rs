//! Parsing options and configuration.

use super::dom::{DomParser, ScraperDomParser};
use super::handlers::TagHandler;
use crate::error::{Error, Result};
use crate::model::{StyleMap, StyleValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Options for parsing HTML.
///
/// Handlers and default styles are keyed by lower-cased tag name.
#[derive(Clone)]
pub struct ParseOptions {
    /// User-registered tag handlers, checked before the built-in table
    handlers: HashMap<String, Arc<dyn TagHandler>>,

    /// Element-type default styles
    default_styles: HashMap<String, StyleMap>,

    /// DOM collaborator
    dom_parser: Arc<dyn DomParser>,

    /// Whether to parse top-level siblings in parallel
    pub parallel: bool,

    /// Whether to collapse whitespace runs in text outside `pre`
    pub collapse_whitespace: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel parsing of top-level siblings.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable whitespace collapsing.
    pub fn with_collapse_whitespace(mut self, collapse: bool) -> Self {
        self.collapse_whitespace = collapse;
        self
    }

    /// Replace the DOM collaborator.
    pub fn with_dom_parser(mut self, parser: impl DomParser + 'static) -> Self {
        self.dom_parser = Arc::new(parser);
        self
    }

    /// Register a handler for `tag` (case-insensitive); last registration wins.
    pub fn register_tag_handler(
        &mut self,
        tag: &str,
        handler: impl TagHandler + 'static,
    ) -> Result<()> {
        let tag = normalize_tag(tag)?;
        if self.handlers.insert(tag.clone(), Arc::new(handler)).is_some() {
            log::debug!("Replacing tag handler for <{}>", tag);
        }
        Ok(())
    }

    /// Set the default styles for `tag`, replacing any previous defaults.
    pub fn set_default_styles(&mut self, tag: &str, styles: StyleMap) -> Result<()> {
        let tag = normalize_tag(tag)?;
        self.default_styles.insert(tag, styles);
        Ok(())
    }

    /// Get the registered handler for `tag`.
    pub fn handler(&self, tag: &str) -> Option<&Arc<dyn TagHandler>> {
        self.handlers.get(tag)
    }

    /// Get the default styles for `tag`.
    pub fn default_styles(&self, tag: &str) -> Option<&StyleMap> {
        self.default_styles.get(tag)
    }

    /// Get the DOM collaborator.
    pub fn dom_parser(&self) -> &dyn DomParser {
        self.dom_parser.as_ref()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            default_styles: builtin_default_styles(),
            dom_parser: Arc::new(ScraperDomParser),
            parallel: false,
            collapse_whitespace: true,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&String> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("ParseOptions")
            .field("handlers", &handlers)
            .field("default_styles", &self.default_styles.len())
            .field("parallel", &self.parallel)
            .field("collapse_whitespace", &self.collapse_whitespace)
            .finish()
    }
}

fn normalize_tag(tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return Err(Error::InvalidTagName(tag.to_string()));
    }
    Ok(tag.to_ascii_lowercase())
}

fn styles(pairs: &[(&str, &str)]) -> StyleMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), StyleValue::from(*v)))
        .collect()
}

/// Browser-like element defaults.
fn builtin_default_styles() -> HashMap<String, StyleMap> {
    let bold = [("fontWeight", "bold")];
    let italic = [("fontStyle", "italic")];
    let mut table = HashMap::new();

    for tag in ["strong", "b", "dt"] {
        table.insert(tag.to_string(), styles(&bold));
    }
    for tag in ["em", "i", "cite", "var"] {
        table.insert(tag.to_string(), styles(&italic));
    }
    for tag in ["u", "ins"] {
        table.insert(tag.to_string(), styles(&[("textDecoration", "underline")]));
    }
    for tag in ["s", "strike", "del"] {
        table.insert(tag.to_string(), styles(&[("textDecoration", "line-through")]));
    }
    for tag in ["code", "kbd", "samp"] {
        table.insert(tag.to_string(), styles(&[("fontFamily", "monospace")]));
    }
    for tag in ["blockquote", "dd"] {
        table.insert(tag.to_string(), styles(&[("marginLeft", "40px")]));
    }

    let headings = [
        ("h1", "32px"),
        ("h2", "24px"),
        ("h3", "18.72px"),
        ("h4", "16px"),
        ("h5", "13.28px"),
        ("h6", "10.72px"),
    ];
    for (tag, size) in headings {
        table.insert(
            tag.to_string(),
            styles(&[("fontSize", size), ("fontWeight", "bold")]),
        );
    }

    table.insert("sup".to_string(), styles(&[("verticalAlign", "super")]));
    table.insert("sub".to_string(), styles(&[("verticalAlign", "sub")]));
    table.insert(
        "pre".to_string(),
        styles(&[("fontFamily", "monospace"), ("whiteSpace", "pre")]),
    );
    table.insert(
        "th".to_string(),
        styles(&[("fontWeight", "bold"), ("textAlign", "center")]),
    );
    table.insert(
        "figcaption".to_string(),
        styles(&[("fontStyle", "italic"), ("textAlign", "center")]),
    );
    table.insert(
        "a".to_string(),
        styles(&[("color", "#0000EE"), ("textDecoration", "underline")]),
    );
    table.insert("mark".to_string(), styles(&[("backgroundColor", "yellow")]));
    table.insert("small".to_string(), styles(&[("fontSize", "13px")]));

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};
    use crate::parser::dom::Element;
    use crate::parser::handlers::ElementInput;
    use crate::parser::HtmlParser;

    #[test]
    fn test_default_options() {
        let opts = ParseOptions::default();
        assert!(!opts.parallel);
        assert!(opts.collapse_whitespace);
        assert_eq!(
            opts.default_styles("th")
                .and_then(|s| s.get("textAlign"))
                .and_then(|v| v.as_str()),
            Some("center")
        );
        assert!(opts.default_styles("p").is_none());
    }

    #[test]
    fn test_builder() {
        let opts = ParseOptions::new()
            .with_parallel(true)
            .with_collapse_whitespace(false);
        assert!(opts.parallel);
        assert!(!opts.collapse_whitespace);
        assert!(!opts.sequential().parallel);
    }

    #[test]
    fn test_register_tag_handler_case_insensitive() {
        let mut opts = ParseOptions::new();
        opts.register_tag_handler("Widget", |_: ElementInput, _: &Element, _: &HtmlParser| {
            Node::new(NodeKind::Custom)
        })
        .unwrap();
        assert!(opts.handler("widget").is_some());
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let mut opts = ParseOptions::new();
        let result = opts.set_default_styles("  ", StyleMap::new());
        assert!(matches!(result, Err(Error::InvalidTagName(_))));
        let result = opts.register_tag_handler("a b", |_: ElementInput, _: &Element, _: &HtmlParser| {
            Node::new(NodeKind::Custom)
        });
        assert!(matches!(result, Err(Error::InvalidTagName(_))));
    }
}
