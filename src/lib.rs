//! # htmldoc
//!
//! HTML to document conversion pipeline for Rust.
//!
//! HTML is parsed into an intermediate element tree (IET) of paragraphs,
//! headings, text runs, lists, tables and images with resolved raw styles.
//! Backend adapters then walk the tree through a shared dispatcher, map
//! styles with per-backend mapping tables and lay out tables through one
//! merge-aware grid builder.
//!
//! ## Quick Start
//!
//! ```
//! use htmldoc::{parse_html, render};
//!
//! fn main() -> htmldoc::Result<()> {
//!     let nodes = parse_html("<h1>Title</h1><p>Some <em>text</em></p>");
//!
//!     let options = render::RenderOptions::default();
//!     let markdown = render::to_markdown(&nodes, &options)?;
//!     assert_eq!(markdown, "# Title\n\nSome *text*");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Element tree**: serde-serializable nodes with styles, attributes and metadata
//! - **Extensible parsing**: custom tag handlers and per-tag default styles
//! - **Style resolution**: shorthand expansion, scope-aware inheritance, mapping tables
//! - **Table grids**: colspan/rowspan resolved once for every backend
//! - **Dispatcher**: pluggable block, inline and fallthrough converters
//! - **Parallel parsing**: uses Rayon for independent top-level elements

pub mod convert;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod grid;
pub mod model;
pub mod parser;
pub mod render;
pub mod style;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
};
pub use detect::{detect_kind, HtmlKind};
pub use dispatch::{Backend, Dispatcher, ElementConverter, FallthroughConverter};
pub use error::{Error, Result};
pub use grid::{build_grid, CellRef, Grid, GridCell, MAX_COLSPAN, MAX_ROWSPAN};
pub use model::{AttributeMap, Metadata, Node, NodeKind, Scope, StyleMap, StyleValue};
pub use parser::{HtmlParser, ParseOptions, TagHandler};
pub use render::{JsonFormat, RenderOptions, TableFallback};
pub use style::{StyleMeta, StyleResolver};

use std::path::Path;

/// Parse HTML into element tree nodes with the default options.
///
/// # Example
///
/// ```
/// use htmldoc::{parse_html, NodeKind};
///
/// let nodes = parse_html("<p>Hello</p>");
/// assert_eq!(nodes[0].kind, NodeKind::Paragraph);
/// assert_eq!(nodes[0].text.as_deref(), Some("Hello"));
/// ```
pub fn parse_html(html: &str) -> Vec<Node> {
    HtmlParser::new().parse(html)
}

/// Parse HTML with custom options.
///
/// # Example
///
/// ```
/// use htmldoc::parser::{Element, ElementInput};
/// use htmldoc::{parse_html_with_options, HtmlParser, NodeKind, ParseOptions};
///
/// let mut options = ParseOptions::new();
/// options.register_tag_handler("note", |input: ElementInput, _: &Element, _: &HtmlParser| {
///     input.into_node(NodeKind::Paragraph)
/// })?;
/// let nodes = parse_html_with_options("<note>Remember</note>", options);
/// assert_eq!(nodes[0].kind, NodeKind::Paragraph);
/// # Ok::<(), htmldoc::Error>(())
/// ```
pub fn parse_html_with_options(html: &str, options: ParseOptions) -> Vec<Node> {
    HtmlParser::with_options(options).parse(html)
}

/// Read and parse an HTML file.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
///
/// # Example
///
/// ```no_run
/// use htmldoc::parse_file;
///
/// let nodes = parse_file("page.html").unwrap();
/// println!("Top-level nodes: {}", nodes.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Node>> {
    let bytes = std::fs::read(path.as_ref())?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.as_ref().display());
    Ok(parse_html(&String::from_utf8_lossy(&bytes)))
}

/// Convert HTML to Markdown.
///
/// # Example
///
/// ```
/// use htmldoc::{to_markdown, RenderOptions};
///
/// let markdown = to_markdown("<ul><li>one</li><li>two</li></ul>", &RenderOptions::default())?;
/// assert_eq!(markdown, "- one\n- two");
/// # Ok::<(), htmldoc::Error>(())
/// ```
pub fn to_markdown(html: &str, options: &RenderOptions) -> Result<String> {
    render::to_markdown(&parse_html(html), options)
}

/// Convert HTML to plain text.
pub fn to_text(html: &str, options: &RenderOptions) -> Result<String> {
    render::to_text(&parse_html(html), options)
}

/// Convert HTML to a JSON dump of its element tree.
pub fn to_json(html: &str, format: JsonFormat) -> Result<String> {
    render::to_json(&parse_html(html), format)
}

/// Parse and convert HTML with the adapter selected by `options.output_format`.
///
/// # Example
///
/// ```
/// use htmldoc::{convert_html, ConvertOptions, OutputFormat};
///
/// let options = ConvertOptions::new().with_format(OutputFormat::Text);
/// let result = convert_html("<p>a</p><p>b</p>", &options)?;
/// assert_eq!(result.content, "a\n\nb");
/// assert_eq!(result.mime_type, "text/plain");
/// # Ok::<(), htmldoc::Error>(())
/// ```
pub fn convert_html(html: &str, options: &ConvertOptions) -> Result<ConvertResult> {
    let nodes = HtmlParser::with_options(options.parse.clone()).parse(html);
    ConverterRegistry::with_defaults().convert(&nodes, options.output_format.name(), options)
}
