//! HTML parsing module.

mod css;
mod dom;
mod handlers;
mod html_parser;
mod options;

pub use css::{kebab_to_camel, parse_inline_style};
pub use dom::{Document, DomNode, DomParser, Element, ScraperDomParser};
pub use handlers::{ElementInput, TagHandler};
pub use html_parser::{
    collapse_whitespace, flatten_fragments, hoist_attributes, HtmlParser, ParseContext,
};
pub use options::ParseOptions;
