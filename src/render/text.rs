//! Plain text rendering for element trees.

use crate::error::Result;
use crate::grid::row_cells;
use crate::model::{Node, NodeKind};

use super::RenderOptions;

/// Convert element tree nodes to plain text.
///
/// Blocks are separated by blank lines, list items go one per line and
/// table rows one per line with tab-separated cells.
pub fn to_text(nodes: &[Node], options: &RenderOptions) -> Result<String> {
    let mut blocks = Vec::new();
    for node in nodes {
        collect_blocks(node, options, &mut blocks);
    }
    let blocks: Vec<String> = blocks
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    Ok(blocks.join("\n\n"))
}

fn collect_blocks(node: &Node, options: &RenderOptions, out: &mut Vec<String>) {
    match node.kind {
        NodeKind::Line | NodeKind::Attribute { .. } => {}
        NodeKind::List { .. } => out.push(list_text(node, options)),
        NodeKind::Table => out.push(table_text(node, options)),
        NodeKind::Heading { .. } => out.push(inline_text(node, options)),
        NodeKind::Text | NodeKind::Image => out.push(inline_text(node, options)),
        _ => {
            let mut chunk = String::new();
            if node.content.is_empty() {
                chunk.push_str(node.text.as_deref().unwrap_or_default());
            }
            for child in &node.content {
                if child.is_inline() {
                    chunk.push_str(&inline_text(child, options));
                    continue;
                }
                if !chunk.is_empty() {
                    out.push(std::mem::take(&mut chunk));
                }
                collect_blocks(child, options, out);
            }
            if !chunk.is_empty() {
                out.push(chunk);
            }
        }
    }
}

/// Text of a node with every descendant flattened into one run.
fn inline_text(node: &Node, options: &RenderOptions) -> String {
    match node.kind {
        NodeKind::Image => node.attribute("alt").unwrap_or_default(),
        NodeKind::Text if node.is_line_break() => {
            if options.preserve_line_breaks {
                "\n".to_string()
            } else {
                " ".to_string()
            }
        }
        _ if node.content.is_empty() => node.text.clone().unwrap_or_default(),
        _ => node
            .content
            .iter()
            .map(|child| inline_text(child, options))
            .collect(),
    }
}

fn list_text(list: &Node, options: &RenderOptions) -> String {
    let indent = "  ".repeat(list.level().unwrap_or(0));
    let mut lines = Vec::new();
    for item in &list.content {
        let mut text = String::new();
        let mut nested = Vec::new();
        match (&item.text, item.content.is_empty()) {
            (Some(t), true) => text.push_str(t),
            _ => {
                for child in &item.content {
                    match child.kind {
                        NodeKind::List { .. } => nested.push(list_text(child, options)),
                        _ => text.push_str(&inline_text(child, options)),
                    }
                }
            }
        }
        let text = text.trim();
        if !text.is_empty() {
            lines.push(format!("{}{}", indent, text.replace('\n', " ")));
        }
        lines.extend(nested);
    }
    lines.join("\n")
}

fn table_text(table: &Node, options: &RenderOptions) -> String {
    table
        .content
        .iter()
        .map(|row| {
            row_cells(row)
                .map(|cell| inline_text(cell, options).trim().replace('\n', " "))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
