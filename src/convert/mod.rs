//! Output adapter registry.
//!
//! Adapters turn a parsed element tree into one output format. The
//! registry maps format names and aliases to adapters so callers can pick
//! an output by name.
//!
//! # Example
//!
//! ```
//! use htmldoc::convert::{ConverterRegistry, ConvertOptions};
//!
//! fn main() -> htmldoc::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let nodes = htmldoc::parse_html("<p>Hello <b>world</b></p>");
//!
//!     let result = registry.convert(&nodes, "md", &ConvertOptions::default())?;
//!     assert_eq!(result.content, "Hello **world**");
//!     Ok(())
//! }
//! ```

mod adapters;

pub use adapters::{JsonConverter, MarkdownConverter, TextConverter};

use crate::error::{Error, Result};
use crate::model::Node;
use crate::parser::ParseOptions;
use crate::render::{JsonFormat, RenderOptions};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Options for a full HTML conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Parsing options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Output format
    pub output_format: OutputFormat,

    /// Layout of JSON output
    pub json_format: JsonFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parsing options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown format
    #[default]
    Markdown,

    /// Plain text
    Text,

    /// JSON dump of the element tree
    Json,
}

impl OutputFormat {
    /// Registry name of the format.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted content
    pub content: String,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String) -> Self {
        Self {
            content,
            mime_type: "text/markdown",
        }
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for output adapters.
///
/// Implement this trait to add a new output format.
pub trait DocumentConverter: Send + Sync {
    /// Get the format names this adapter answers to.
    ///
    /// Names should be lowercase (e.g., `["markdown", "md"]`).
    fn formats(&self) -> &[&str];

    /// Get the name of this adapter.
    fn name(&self) -> &str;

    /// Get the MIME type of the output.
    fn mime_type(&self) -> &'static str;

    /// Convert element tree nodes.
    fn convert(&self, nodes: &[Node], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this adapter answers to the given format name.
    fn supports_format(&self, format: &str) -> bool {
        let format = format.to_lowercase();
        self.formats().iter().any(|f| *f == format)
    }
}

/// Registry of output adapters keyed by format name.
///
/// Later registrations replace earlier ones for the same name.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the Markdown, text and JSON adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownConverter::new()));
        registry.register(Arc::new(TextConverter::new()));
        registry.register(Arc::new(JsonConverter::new()));
        registry
    }

    /// Register an adapter under all its format names.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for format in converter.formats() {
            if let Some(previous) = self
                .converters
                .insert(format.to_lowercase(), converter.clone())
            {
                log::debug!(
                    "Format {} moved from adapter {} to {}",
                    format,
                    previous.name(),
                    converter.name()
                );
            }
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get an adapter by format name.
    pub fn get_by_format(&self, format: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&format.to_lowercase()).cloned()
    }

    /// Get an adapter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if a format is supported.
    pub fn supports(&self, format: &str) -> bool {
        self.converters.contains_key(&format.to_lowercase())
    }

    /// Get all supported format names, sorted.
    pub fn supported_formats(&self) -> Vec<&str> {
        let mut formats: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        formats.sort_unstable();
        formats
    }

    /// Convert nodes with the adapter registered for `format`.
    pub fn convert(
        &self,
        nodes: &[Node],
        format: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;

        log::debug!("Converting {} nodes with adapter {}", nodes.len(), converter.name());
        converter.convert(nodes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("formats", &self.supported_formats())
            .finish()
    }
}
