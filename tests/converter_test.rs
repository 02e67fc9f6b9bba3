//! Integration tests for the converter module.

use htmldoc::convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
};
use htmldoc::error::Result;
use htmldoc::{convert_html, parse_html, Error, JsonFormat, Node, RenderOptions, TableFallback};
use std::sync::Arc;

const REPORT: &str = concat!(
    "<h1>Report</h1>",
    "<p>Intro with <strong>bold</strong> and <code>code</code>.</p>",
    "<ol start=\"2\"><li>two</li><li>three</li></ol>",
    "<table><tr><th>K</th><th>V</th></tr><tr><td>a</td><td>1</td></tr></table>"
);

/// Mock converter for testing.
struct MockConverter {
    formats: Vec<&'static str>,
    name: &'static str,
}

impl MockConverter {
    fn new(formats: Vec<&'static str>, name: &'static str) -> Self {
        Self { formats, name }
    }
}

impl DocumentConverter for MockConverter {
    fn formats(&self) -> &[&str] {
        &self.formats
    }

    fn name(&self) -> &str {
        self.name
    }

    fn mime_type(&self) -> &'static str {
        "text/x-mock"
    }

    fn convert(&self, nodes: &[Node], _options: &ConvertOptions) -> Result<ConvertResult> {
        Ok(
            ConvertResult::new(format!("{} nodes converted by {}", nodes.len(), self.name))
                .with_mime_type(self.mime_type()),
        )
    }
}

#[test]
fn test_markdown_output() {
    let result = convert_html(REPORT, &ConvertOptions::default()).unwrap();
    assert_eq!(result.mime_type, "text/markdown");
    assert_eq!(
        result.content,
        concat!(
            "# Report\n\n",
            "Intro with **bold** and `code`.\n\n",
            "2. two\n3. three\n\n",
            "| K | V |\n",
            "| :---: | :---: |\n",
            "| a | 1 |"
        )
    );
}

#[test]
fn test_text_output() {
    let options = ConvertOptions::new().with_format(OutputFormat::Text);
    let result = convert_html(REPORT, &options).unwrap();
    assert_eq!(result.mime_type, "text/plain");
    assert_eq!(
        result.content,
        "Report\n\nIntro with bold and code.\n\ntwo\nthree\n\nK\tV\na\t1"
    );
}

#[test]
fn test_json_output() {
    let options = ConvertOptions::new()
        .with_format(OutputFormat::Json)
        .with_json_format(JsonFormat::Compact);
    let result = convert_html("<p>x</p>", &options).unwrap();
    assert_eq!(result.mime_type, "application/json");

    let back: Vec<Node> = serde_json::from_str(&result.content).unwrap();
    assert_eq!(back, parse_html("<p>x</p>"));
}

#[test]
fn test_html_table_fallback() {
    let html = r#"<table><tr><td rowspan="2">m</td><td>a</td></tr><tr><td>b</td></tr></table>"#;
    let options = ConvertOptions::new().with_render_options(
        RenderOptions::new().with_table_fallback(TableFallback::Html),
    );
    let result = convert_html(html, &options).unwrap();
    assert_eq!(
        result.content,
        "<table>\n<tr><td rowspan=\"2\">m</td><td>a</td></tr>\n<tr><td>b</td></tr>\n</table>"
    );
}

#[test]
fn test_converter_registry_new() {
    let registry = ConverterRegistry::new();
    assert!(!registry.supports("markdown"));
    assert!(registry.supported_formats().is_empty());
}

#[test]
fn test_register_mock_converter() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(MockConverter::new(vec!["mock", "mk"], "mock")));

    assert!(registry.supports("mock"));
    assert!(registry.supports("MK"));
    assert!(registry.get_by_name("mock").is_some());

    let nodes = parse_html("<p>a</p><p>b</p>");
    let result = registry
        .convert(&nodes, "mk", &ConvertOptions::default())
        .unwrap();
    assert_eq!(result.content, "2 nodes converted by mock");
    assert_eq!(result.mime_type, "text/x-mock");
    assert_eq!(result.content_len(), result.content.len());
}

#[test]
fn test_later_registration_replaces_alias() {
    let mut registry = ConverterRegistry::with_defaults();
    registry.register(Arc::new(MockConverter::new(vec!["md"], "mock")));

    let nodes = parse_html("<p>a</p>");
    let options = ConvertOptions::default();
    assert_eq!(
        registry.convert(&nodes, "md", &options).unwrap().content,
        "1 nodes converted by mock"
    );
    assert_eq!(
        registry.convert(&nodes, "markdown", &options).unwrap().content,
        "a"
    );
}

#[test]
fn test_unsupported_format() {
    let registry = ConverterRegistry::with_defaults();
    let result = registry.convert(&[], "docx", &ConvertOptions::default());
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}
