//! Built-in output adapters.

use crate::error::Result;
use crate::model::Node;
use crate::render::{to_json, to_text, MarkdownRenderer};

use super::{ConvertOptions, ConvertResult, DocumentConverter};

/// Markdown adapter.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    _private: (),
}

impl MarkdownConverter {
    /// Create a new Markdown adapter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for MarkdownConverter {
    fn formats(&self) -> &[&str] {
        &["markdown", "md"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn mime_type(&self) -> &'static str {
        "text/markdown"
    }

    fn convert(&self, nodes: &[Node], options: &ConvertOptions) -> Result<ConvertResult> {
        let content = MarkdownRenderer::new(options.render.clone()).render(nodes)?;
        Ok(ConvertResult::new(content).with_mime_type(self.mime_type()))
    }
}

/// Plain text adapter.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    /// Create a new plain text adapter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for TextConverter {
    fn formats(&self) -> &[&str] {
        &["text", "txt"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn mime_type(&self) -> &'static str {
        "text/plain"
    }

    fn convert(&self, nodes: &[Node], options: &ConvertOptions) -> Result<ConvertResult> {
        let content = to_text(nodes, &options.render)?;
        Ok(ConvertResult::new(content).with_mime_type(self.mime_type()))
    }
}

/// JSON adapter dumping the element tree.
#[derive(Debug, Clone, Default)]
pub struct JsonConverter {
    _private: (),
}

impl JsonConverter {
    /// Create a new JSON adapter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for JsonConverter {
    fn formats(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn convert(&self, nodes: &[Node], options: &ConvertOptions) -> Result<ConvertResult> {
        let content = to_json(nodes, options.json_format)?;
        Ok(ConvertResult::new(content).with_mime_type(self.mime_type()))
    }
}
