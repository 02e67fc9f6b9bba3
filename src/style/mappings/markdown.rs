//! Markdown mapping table.
//!
//! Markdown has no styling model, so properties map to boolean formatting
//! flags the renderer turns into emphasis markers.

use super::{is_bold, is_italic, nested, obj, text_align};
use crate::model::{Node, NodeKind};
use crate::style::merge::BackendStyles;
use crate::style::resolver::{mapper, PropertyMapper};
use serde_json::json;

const MONOSPACE: &[&str] = &["monospace", "courier", "courier new", "consolas", "menlo"];

/// Build the Markdown mapping table.
pub fn mappings() -> Vec<(&'static str, PropertyMapper)> {
    vec![
        ("fontWeight", mapper(font_weight)),
        ("fontStyle", mapper(font_style)),
        ("fontFamily", mapper(font_family)),
        ("textDecoration", mapper(text_decoration)),
        ("textDecorationLine", mapper(text_decoration)),
        ("verticalAlign", mapper(vertical_align)),
        ("textAlign", mapper(alignment)),
        ("whiteSpace", mapper(white_space)),
    ]
}

fn flag(name: &str, on: bool) -> BackendStyles {
    nested(&[name], json!(on))
}

fn font_weight(value: &str, _node: &Node) -> BackendStyles {
    is_bold(value).map(|b| flag("strong", b)).unwrap_or_default()
}

fn font_style(value: &str, _node: &Node) -> BackendStyles {
    is_italic(value).map(|i| flag("emphasis", i)).unwrap_or_default()
}

fn font_family(value: &str, _node: &Node) -> BackendStyles {
    let lower = value.to_ascii_lowercase();
    let code = lower
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .any(|f| MONOSPACE.contains(&f));
    if code {
        flag("code", true)
    } else {
        BackendStyles::new()
    }
}

fn text_decoration(value: &str, _node: &Node) -> BackendStyles {
    let lower = value.to_ascii_lowercase();
    let mut out = BackendStyles::new();
    for token in lower.split_whitespace() {
        match token {
            "underline" => out.extend(flag("underline", true)),
            "line-through" => out.extend(flag("strikethrough", true)),
            "none" => {
                out.extend(flag("underline", false));
                out.extend(flag("strikethrough", false));
            }
            _ => {}
        }
    }
    out
}

fn vertical_align(value: &str, node: &Node) -> BackendStyles {
    if node.kind != NodeKind::Text {
        return BackendStyles::new();
    }
    match value.to_ascii_lowercase().as_str() {
        "super" => flag("superscript", true),
        "sub" => flag("subscript", true),
        _ => BackendStyles::new(),
    }
}

fn alignment(value: &str, node: &Node) -> BackendStyles {
    if !matches!(node.kind, NodeKind::TableCell { .. }) {
        return BackendStyles::new();
    }
    text_align(value)
        .map(|align| obj(json!({ "align": align })))
        .unwrap_or_default()
}

fn white_space(value: &str, _node: &Node) -> BackendStyles {
    match value.to_ascii_lowercase().as_str() {
        "pre" | "pre-wrap" => flag("preformatted", true),
        _ => BackendStyles::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Node, NodeKind};
    use crate::style::StyleResolver;
    use serde_json::{json, Value};

    fn map(node: &Node) -> Value {
        Value::Object(StyleResolver::markdown().map_styles(&node.styles, node))
    }

    #[test]
    fn test_flags() {
        let node = Node::text("x")
            .with_style("fontWeight", "bold")
            .with_style("fontStyle", "italic")
            .with_style("textDecoration", "underline line-through");
        assert_eq!(
            map(&node),
            json!({"strong": true, "emphasis": true, "underline": true, "strikethrough": true})
        );
    }

    #[test]
    fn test_code_font() {
        let node = Node::text("x").with_style("fontFamily", "'Courier New', monospace");
        assert_eq!(map(&node), json!({"code": true}));
        let node = Node::text("x").with_style("fontFamily", "Arial");
        assert_eq!(map(&node), json!({}));
    }

    #[test]
    fn test_align_only_on_cells() {
        let cell = Node::new(NodeKind::TableCell { header: true }).with_style("textAlign", "center");
        assert_eq!(map(&cell), json!({"align": "center"}));
        let para = Node::paragraph(vec![]).with_style("textAlign", "center");
        assert_eq!(map(&para), json!({}));
    }
}
