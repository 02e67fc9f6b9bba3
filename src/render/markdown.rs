//! Markdown rendering for element trees.
//!
//! The renderer is a [`Dispatcher`] over a string backend with the Markdown
//! style mapping table; callers can register their own converters on it
//! before rendering.

use crate::dispatch::{Backend, Dispatcher, Parent, Rule};
use crate::error::Result;
use crate::grid::{build_grid, Grid, GridCell};
use crate::model::{Node, NodeKind, StyleMap};
use crate::style::{BackendStyles, StyleResolver};
use serde_json::Value;

use super::{RenderOptions, TableFallback};

/// Indentation added per list nesting level.
const LIST_INDENT: &str = "   ";

type Md = Dispatcher<MarkdownBackend>;

/// Convert element tree nodes to Markdown.
pub fn to_markdown(nodes: &[Node], options: &RenderOptions) -> Result<String> {
    MarkdownRenderer::new(options.clone()).render(nodes)
}

/// String backend for Markdown output.
#[derive(Debug, Clone)]
pub struct MarkdownBackend {
    options: RenderOptions,
}

impl MarkdownBackend {
    /// Get the render options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

impl Backend for MarkdownBackend {
    type Block = String;
    type Inline = String;

    fn line_break(&self) -> String {
        if self.options.preserve_line_breaks {
            "  \n".to_string()
        } else {
            " ".to_string()
        }
    }
}

/// Markdown renderer.
#[derive(Debug)]
pub struct MarkdownRenderer {
    dispatcher: Md,
}

impl MarkdownRenderer {
    /// Create a renderer with the built-in converters.
    pub fn new(options: RenderOptions) -> Self {
        let mut dispatcher = Dispatcher::new(MarkdownBackend { options }, StyleResolver::markdown());
        register_builtins(&mut dispatcher);
        Self { dispatcher }
    }

    /// Get the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<MarkdownBackend> {
        &self.dispatcher
    }

    /// Get the dispatcher for registering converters.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<MarkdownBackend> {
        &mut self.dispatcher
    }

    /// Render nodes to Markdown.
    pub fn render(&self, nodes: &[Node]) -> Result<String> {
        let blocks: Vec<String> = self
            .dispatcher
            .convert(nodes)
            .into_iter()
            .filter(|b| !b.trim().is_empty())
            .collect();
        Ok(blocks.join("\n\n"))
    }
}

fn register_builtins(d: &mut Md) {
    d.add_builtin_block_converter(Rule::new(
        |n: &Node| matches!(n.kind, NodeKind::Heading { .. }),
        heading_block,
    ));
    d.add_builtin_block_converter(Rule::new(
        |n: &Node| matches!(n.kind, NodeKind::List { .. }),
        list_block,
    ));
    d.add_builtin_block_converter(Rule::new(|n: &Node| n.kind == NodeKind::Table, table_block));
    d.add_builtin_block_converter(Rule::new(
        |n: &Node| n.kind == NodeKind::Line,
        |_: &Md, _: &Node, _: &StyleMap| vec!["---".to_string()],
    ));
    d.add_builtin_block_converter(Rule::new(
        |n: &Node| matches!(n.kind, NodeKind::Attribute { .. }),
        |_: &Md, _: &Node, _: &StyleMap| Vec::new(),
    ));
    d.add_builtin_block_converter(Rule::new(|n: &Node| n.is_inline(), inline_block));
    d.add_builtin_block_converter(Rule::new(|_: &Node| true, container_block));

    d.add_builtin_inline_converter(Rule::new(|n: &Node| n.kind == NodeKind::Text, text_inline));
    d.add_builtin_inline_converter(Rule::new(|n: &Node| n.kind == NodeKind::Image, image_inline));
    d.add_builtin_inline_converter(Rule::new(
        |n: &Node| !matches!(n.kind, NodeKind::Attribute { .. }),
        |d: &Md, n: &Node, c: &StyleMap| d.convert_inline_children(n, c),
    ));

    d.add_wrap_rule(
        |n| n.attributes.contains_key("id"),
        |d, n, mut blocks| {
            if !d.backend().options.anchors || blocks.is_empty() {
                return blocks;
            }
            if let Some(id) = n.attribute("id") {
                blocks.insert(0, format!("<a id=\"{}\"></a>", id));
            }
            blocks
        },
    );
}

fn flag(flags: &BackendStyles, name: &str) -> bool {
    flags.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn paragraph_text(runs: Vec<String>) -> String {
    runs.concat().trim().to_string()
}

fn heading_block(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    let NodeKind::Heading { level } = node.kind else {
        return Vec::new();
    };
    let level = level.min(d.backend().options.max_heading_level).max(1);

    // Headings are bold by default; the marker already says so.
    let mut plain = cascaded.clone();
    plain.remove("fontWeight");
    let text = single_line(&d.convert_inline_children(node, &plain).concat(), " ");
    if text.is_empty() {
        return Vec::new();
    }
    vec![format!("{} {}", "#".repeat(level as usize), text)]
}

fn container_block(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    let flags = d.map_styles(cascaded, node);
    if flag(&flags, "preformatted") {
        return vec![fenced(&node.plain_text())];
    }

    let blocks = d.convert_to_blocks(node, cascaded, paragraph_text, None, false);
    if node.tag_name() == Some("blockquote") {
        let body: Vec<String> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
        return vec![quote(&body.join("\n\n"))];
    }
    blocks
}

fn inline_block(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    let wrapper = Node::paragraph(vec![node.clone()]);
    d.convert_to_blocks(&wrapper, cascaded, paragraph_text, None, false)
}

fn list_block(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    let NodeKind::List { ordered } = node.kind else {
        return Vec::new();
    };
    let indent = LIST_INDENT.repeat(node.level().unwrap_or(0));
    let parent = Parent::of(node, cascaded);
    let mut number = node
        .attributes
        .get("start")
        .and_then(|v| v.as_number())
        .map_or(1, |n| n as i64);

    let mut lines = Vec::new();
    for item in &node.content {
        if item.kind != NodeKind::ListItem {
            lines.extend(
                d.convert_block(item, parent)
                    .iter()
                    .filter(|b| !b.is_empty())
                    .map(|b| indent_lines(b, &indent)),
            );
            continue;
        }
        let marker = if ordered {
            number += 1;
            format!("{}.", number - 1)
        } else {
            d.backend().options.list_marker.to_string()
        };
        let item_cascaded = d.cascade(item, parent);
        lines.push(list_item(d, item, &item_cascaded, &indent, &marker));
    }
    vec![lines.join("\n")]
}

fn list_item(d: &Md, item: &Node, cascaded: &StyleMap, indent: &str, marker: &str) -> String {
    let continuation = format!("{}{}", indent, " ".repeat(marker.len() + 1));
    let nested: &dyn Fn(&Node, Parent<'_>) -> Vec<String> = &|child, parent| {
        let blocks = d.convert_block(child, parent);
        if matches!(child.kind, NodeKind::List { .. }) {
            blocks
        } else {
            blocks.iter().map(|b| indent_lines(b, &continuation)).collect()
        }
    };
    let blocks = d.convert_to_blocks(
        item,
        cascaded,
        |runs| indent_lines(&paragraph_text(runs), &continuation),
        Some(nested),
        true,
    );

    let starts_with_list = item
        .content
        .first()
        .is_some_and(|c| matches!(c.kind, NodeKind::List { .. }));
    let mut parts = blocks.into_iter().filter(|b| !b.trim().is_empty()).peekable();
    let mut out = format!("{}{}", indent, marker);
    if !starts_with_list {
        if let Some(first) = parts.next() {
            out.push(' ');
            out.push_str(first.strip_prefix(continuation.as_str()).unwrap_or(&first));
        }
    }
    for part in parts {
        out.push('\n');
        out.push_str(&part);
    }
    out
}

fn table_block(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    let grid = build_grid(&node.content);
    if grid.column_count() == 0 {
        return Vec::new();
    }

    let options = &d.backend().options;
    let mut blocks = Vec::new();
    let caption = node
        .metadata
        .get("caption")
        .map(descriptor_text)
        .filter(|c| !c.is_empty());

    if grid.has_merged_cells() && options.table_fallback == TableFallback::Html {
        blocks.push(html_table(d, node, cascaded, &grid, caption.as_deref()));
        return blocks;
    }

    if let Some(caption) = caption {
        blocks.push(caption);
    }
    blocks.push(pipe_table(d, node, cascaded, &grid));
    blocks
}

/// Cell node, cascaded styles and Markdown flags for a grid master.
fn resolve_cell<'a>(
    d: &Md,
    table: &'a Node,
    table_cascaded: &StyleMap,
    grid: &Grid,
    slot: &GridCell,
) -> Option<(&'a Node, StyleMap)> {
    let source = slot.source()?;
    let row = table.content.get(source.row)?;
    let cell = grid.cell(&table.content, source)?;
    let row_cascaded = d.cascade(row, Parent::of(table, table_cascaded));
    let cascaded = d.cascade(cell, Parent::of(row, &row_cascaded));
    Some((cell, cascaded))
}

fn cell_content(d: &Md, cell: &Node, cascaded: &StyleMap) -> String {
    let blocks = d.convert_to_blocks(cell, cascaded, paragraph_text, None, true);
    single_line(&blocks.join(" "), "<br>")
}

fn pipe_table(d: &Md, node: &Node, cascaded: &StyleMap, grid: &Grid) -> String {
    let escape = d.backend().options.escape_special_chars;
    let mut output = String::new();

    for (r, row) in grid.rows.iter().enumerate() {
        let mut aligns = Vec::with_capacity(row.len());
        output.push('|');
        for slot in row {
            let mut content = String::new();
            let mut align = None;
            if slot.is_master() {
                if let Some((cell, mut cell_cascaded)) = resolve_cell(d, node, cascaded, grid, slot) {
                    if r == 0 {
                        cell_cascaded.remove("fontWeight");
                    }
                    let flags = d.map_styles(&cell_cascaded, cell);
                    align = flags.get("align").and_then(Value::as_str).map(str::to_string);
                    content = cell_content(d, cell, &cell_cascaded);
                }
            }
            if !escape {
                content = content.replace('|', "\\|");
            }
            output.push_str(&format!(" {} |", content));
            aligns.push(align);
        }
        output.push('\n');

        if r == 0 {
            output.push('|');
            for align in &aligns {
                let marker = match align.as_deref() {
                    Some("center") => " :---: |",
                    Some("right") => " ---: |",
                    Some("left") => " :--- |",
                    _ => " --- |",
                };
                output.push_str(marker);
            }
            output.push('\n');
        }
    }

    output.trim_end().to_string()
}

fn html_table(d: &Md, node: &Node, cascaded: &StyleMap, grid: &Grid, caption: Option<&str>) -> String {
    let mut output = String::from("<table>\n");
    if let Some(caption) = caption {
        output.push_str(&format!("<caption>{}</caption>\n", caption));
    }

    for row in &grid.rows {
        output.push_str("<tr>");
        for slot in row {
            let GridCell::Master {
                colspan, rowspan, ..
            } = *slot
            else {
                continue;
            };
            let Some((cell, cell_cascaded)) = resolve_cell(d, node, cascaded, grid, slot) else {
                continue;
            };
            let tag = match cell.kind {
                NodeKind::TableCell { header: true } => "th",
                _ => "td",
            };
            let mut attrs = String::new();
            if rowspan > 1 {
                attrs.push_str(&format!(" rowspan=\"{}\"", rowspan));
            }
            if colspan > 1 {
                attrs.push_str(&format!(" colspan=\"{}\"", colspan));
            }
            output.push_str(&format!(
                "<{}{}>{}</{}>",
                tag,
                attrs,
                cell_content(d, cell, &cell_cascaded),
                tag
            ));
        }
        output.push_str("</tr>\n");
    }

    output.push_str("</table>");
    output
}

fn text_inline(d: &Md, node: &Node, cascaded: &StyleMap) -> Vec<String> {
    if node.is_line_break() {
        return vec![d.backend().line_break()];
    }
    let text = node.text.as_deref().unwrap_or_default();
    if text.is_empty() {
        return Vec::new();
    }

    let flags = d.map_styles(cascaded, node);
    let href = node.attribute("href");
    let styled = apply_text_style(
        text,
        &flags,
        d.backend().options.escape_special_chars,
        href.is_some(),
    );
    match href {
        Some(href) => vec![format!("[{}]({})", styled, href)],
        None => vec![styled],
    }
}

fn image_inline(d: &Md, node: &Node, _cascaded: &StyleMap) -> Vec<String> {
    let Some(src) = node.attribute("src") else {
        return Vec::new();
    };
    let options = &d.backend().options;
    let alt = node.attribute("alt").unwrap_or_default();
    let path = if is_relative(&src) {
        format!("{}{}", options.image_path_prefix, src)
    } else {
        src
    };
    let title = node
        .attribute("title")
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default();

    let image = format!("![{}]({}{})", escape_markdown(&alt), path, title);
    match node.attribute("href") {
        Some(href) => vec![format!("[{}]({})", image, href)],
        None => vec![image],
    }
}

/// Wrap a text run in the markers its flags ask for.
///
/// Surrounding whitespace stays outside the markers.
fn apply_text_style(text: &str, flags: &BackendStyles, escape: bool, linked: bool) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];

    let mut result = if flag(flags, "code") {
        code_span(core)
    } else if escape {
        escape_markdown(core)
    } else {
        core.to_string()
    };

    // Innermost first
    if flag(flags, "strikethrough") {
        result = format!("~~{}~~", result);
    }
    if flag(flags, "emphasis") {
        result = format!("*{}*", result);
    }
    if flag(flags, "strong") {
        result = format!("**{}**", result);
    }
    if flag(flags, "superscript") {
        result = format!("<sup>{}</sup>", result);
    }
    if flag(flags, "subscript") {
        result = format!("<sub>{}</sub>", result);
    }
    if flag(flags, "underline") && !linked {
        result = format!("<u>{}</u>", result);
    }

    format!("{}{}{}", lead, result, trail)
}

fn code_span(text: &str) -> String {
    if text.contains('`') {
        format!("`` {} ``", text)
    } else {
        format!("`{}`", text)
    }
}

fn fenced(text: &str) -> String {
    let fence = if text.contains("```") { "~~~~" } else { "```" };
    format!("{}\n{}\n{}", fence, text.trim_end_matches('\n'), fence)
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fold hard breaks into `separator` and trim.
fn single_line(text: &str, separator: &str) -> String {
    text.replace("  \n", separator)
        .replace('\n', " ")
        .trim()
        .to_string()
}

fn is_relative(src: &str) -> bool {
    !(src.contains("://") || src.starts_with('/') || src.starts_with("data:"))
}

/// Plain text of a hoisted descriptor (or list of descriptors).
fn descriptor_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(descriptor_text)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string(),
        Value::Object(map) => {
            let mut out = map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(content) = map.get("content") {
                out.push_str(&descriptor_text(content));
            }
            out.trim().to_string()
        }
        _ => String::new(),
    }
}

/// Backslash-escape emphasis, code, link, table and HTML openers in a text run.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '<' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(nodes: &[Node]) -> String {
        to_markdown(nodes, &RenderOptions::default()).unwrap()
    }

    fn cell(text: &str) -> Node {
        Node::new(NodeKind::TableCell { header: false }).with_text(text)
    }

    fn row(cells: Vec<Node>) -> Node {
        Node::new(NodeKind::TableRow).with_content(cells)
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("a.b-c"), "a.b-c");
    }

    #[test]
    fn test_text_styles() {
        let para = Node::paragraph(vec![
            Node::text("plain "),
            Node::text("bold").with_style("fontWeight", "bold"),
            Node::text(" and "),
            Node::text("both ")
                .with_style("fontWeight", "700")
                .with_style("fontStyle", "italic"),
            Node::text("gone").with_style("textDecoration", "line-through"),
        ]);
        assert_eq!(
            render(&[para]),
            "plain **bold** and ***both*** ~~gone~~"
        );
    }

    #[test]
    fn test_heading_level_cap() {
        let heading = Node::new(NodeKind::Heading { level: 5 })
            .with_text("Deep")
            .with_style("fontWeight", "bold");
        let options = RenderOptions::default().with_max_heading(3);
        assert_eq!(to_markdown(&[heading], &options).unwrap(), "### Deep");
    }

    #[test]
    fn test_link_and_code() {
        let para = Node::paragraph(vec![
            Node::text("site")
                .with_attribute("href", "https://example.com")
                .with_style("textDecoration", "underline"),
            Node::text(" "),
            Node::text("a_b").with_style("fontFamily", "monospace"),
        ]);
        assert_eq!(render(&[para]), "[site](https://example.com) `a_b`");
    }

    #[test]
    fn test_image_prefix() {
        let img = Node::new(NodeKind::Image)
            .with_attribute("src", "cat.png")
            .with_attribute("alt", "cat");
        let options = RenderOptions::default().with_image_prefix("img/");
        assert_eq!(to_markdown(&[img], &options).unwrap(), "![cat](img/cat.png)");
    }

    #[test]
    fn test_nested_list() {
        let inner = Node::new(NodeKind::List { ordered: true })
            .with_metadata("level", json!(1))
            .with_content(vec![Node::new(NodeKind::ListItem).with_text("one")]);
        let outer = Node::new(NodeKind::List { ordered: false })
            .with_metadata("level", json!(0))
            .with_content(vec![
                Node::new(NodeKind::ListItem)
                    .with_content(vec![Node::text("parent"), inner]),
                Node::new(NodeKind::ListItem).with_text("sibling"),
            ]);
        assert_eq!(render(&[outer]), "- parent\n   1. one\n- sibling");
    }

    #[test]
    fn test_ordered_start() {
        let list = Node::new(NodeKind::List { ordered: true })
            .with_attribute("start", 3.0)
            .with_content(vec![
                Node::new(NodeKind::ListItem).with_text("c"),
                Node::new(NodeKind::ListItem).with_text("d"),
            ]);
        assert_eq!(render(&[list]), "3. c\n4. d");
    }

    #[test]
    fn test_pipe_table() {
        let header = Node::new(NodeKind::TableCell { header: true })
            .with_text("Name")
            .with_style("fontWeight", "bold")
            .with_style("textAlign", "center");
        let table = Node::new(NodeKind::Table).with_content(vec![
            row(vec![header, cell("Age")]),
            row(vec![cell("Ann"), cell("30")]),
        ]);
        assert_eq!(
            render(&[table]),
            "| Name | Age |\n| :---: | --- |\n| Ann | 30 |"
        );
    }

    #[test]
    fn test_merged_cells_markdown_leaves_continuations_empty() {
        let table = Node::new(NodeKind::Table).with_content(vec![
            row(vec![cell("wide").with_attribute("colspan", 2usize)]),
            row(vec![cell("a"), cell("b")]),
        ]);
        assert_eq!(render(&[table]), "| wide |  |\n| --- | --- |\n| a | b |");
    }

    #[test]
    fn test_merged_cells_html_fallback() {
        let table = Node::new(NodeKind::Table).with_content(vec![
            row(vec![cell("wide").with_attribute("colspan", 2usize)]),
            row(vec![cell("a"), cell("b")]),
        ]);
        let options = RenderOptions::default().with_table_fallback(TableFallback::Html);
        assert_eq!(
            to_markdown(&[table], &options).unwrap(),
            "<table>\n<tr><td colspan=\"2\">wide</td></tr>\n<tr><td>a</td><td>b</td></tr>\n</table>"
        );
    }

    #[test]
    fn test_preformatted_block() {
        let pre = Node::paragraph(vec![])
            .with_text("fn main() {}\n")
            .with_style("whiteSpace", "pre");
        assert_eq!(render(&[pre]), "```\nfn main() {}\n```");
    }

    #[test]
    fn test_line_break_and_rule() {
        let para = Node::paragraph(vec![Node::text("a"), Node::line_break(), Node::text("b")]);
        assert_eq!(
            render(&[para, Node::new(NodeKind::Line)]),
            "a  \nb\n\n---"
        );
    }

    #[test]
    fn test_anchor_fallthrough() {
        let heading = Node::new(NodeKind::Heading { level: 2 })
            .with_text("Intro")
            .with_attribute("id", "intro");
        let options = RenderOptions::default().with_anchors(true);
        assert_eq!(
            to_markdown(&[heading.clone()], &options).unwrap(),
            "<a id=\"intro\"></a>\n\n## Intro"
        );
        assert_eq!(render(&[heading]), "## Intro");
    }

    #[test]
    fn test_caption_descriptor_text() {
        let caption = json!([{ "text": "Results", "metadata": { "tagName": "caption" } }]);
        assert_eq!(descriptor_text(&caption), "Results");
    }
}
