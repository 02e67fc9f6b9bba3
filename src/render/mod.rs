//! Reference adapters turning element trees into output formats.

mod json;
mod markdown;
mod options;
mod text;

pub use json::{to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownBackend, MarkdownRenderer};
pub use options::{RenderOptions, TableFallback};
pub use text::to_text;
