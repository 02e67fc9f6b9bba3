//! Word-processor mapping table.
//!
//! Lengths become twips, font sizes half-points, border widths eighths of
//! a point and colors upper-case hex without `#`. Table and cell widths
//! given in percent use fiftieths of a percent.

use super::{
    first_family, hex_color, is_bold, is_italic, nested, obj, text_align, BORDER_SIDES,
    MARGIN_SIDES, PADDING_SIDES,
};
use crate::model::{Node, NodeKind, Scope};
use crate::style::merge::BackendStyles;
use crate::style::resolver::{mapper, PropertyMapper};
use crate::style::units::{Length, Unit, BASE_FONT_PX};
use serde_json::json;

/// Build the word-processor mapping table.
pub fn mappings() -> Vec<(&'static str, PropertyMapper)> {
    let mut table: Vec<(&'static str, PropertyMapper)> = vec![
        ("color", mapper(color)),
        ("backgroundColor", mapper(background_color)),
        ("fontWeight", mapper(font_weight)),
        ("fontStyle", mapper(font_style)),
        ("fontSize", mapper(font_size)),
        ("fontFamily", mapper(font_family)),
        ("fontVariant", mapper(font_variant)),
        ("textDecoration", mapper(text_decoration)),
        ("textDecorationLine", mapper(text_decoration)),
        ("textTransform", mapper(text_transform)),
        ("textAlign", mapper(alignment)),
        ("textIndent", mapper(text_indent)),
        ("verticalAlign", mapper(vertical_align)),
        ("lineHeight", mapper(line_height)),
        ("letterSpacing", mapper(letter_spacing)),
        ("width", mapper(width)),
        ("height", mapper(height)),
    ];

    for border in &BORDER_SIDES {
        let side = border.side;
        table.push((border.width, mapper(move |v, n| border_width(side, v, n))));
        table.push((border.style, mapper(move |v, n| border_style(side, v, n))));
        table.push((border.color, mapper(move |v, n| border_color(side, v, n))));
    }
    for (side, property) in MARGIN_SIDES {
        table.push((property, mapper(move |v, n| margin(side, v, n))));
    }
    for (side, property) in PADDING_SIDES {
        table.push((property, mapper(move |v, n| padding(side, v, n))));
    }

    table
}

fn is_block(node: &Node) -> bool {
    node.scope() == Scope::Block
}

fn color(value: &str, _node: &Node) -> BackendStyles {
    hex_color(value)
        .map(|hex| obj(json!({ "color": hex })))
        .unwrap_or_default()
}

fn background_color(value: &str, _node: &Node) -> BackendStyles {
    hex_color(value)
        .map(|hex| obj(json!({ "shading": { "type": "clear", "color": "auto", "fill": hex } })))
        .unwrap_or_default()
}

fn font_weight(value: &str, _node: &Node) -> BackendStyles {
    is_bold(value)
        .map(|bold| obj(json!({ "bold": bold })))
        .unwrap_or_default()
}

fn font_style(value: &str, _node: &Node) -> BackendStyles {
    is_italic(value)
        .map(|italics| obj(json!({ "italics": italics })))
        .unwrap_or_default()
}

fn font_size(value: &str, _node: &Node) -> BackendStyles {
    let Some(length) = Length::parse_font_size(value) else {
        return BackendStyles::new();
    };
    let half_points = if length.is_percent() {
        Length {
            value: length.value / 100.0 * BASE_FONT_PX,
            unit: Unit::Px,
        }
        .to_half_points()
    } else {
        length.to_half_points()
    };
    half_points
        .map(|size| obj(json!({ "size": size })))
        .unwrap_or_default()
}

fn font_family(value: &str, _node: &Node) -> BackendStyles {
    first_family(value)
        .map(|font| obj(json!({ "font": font })))
        .unwrap_or_default()
}

fn font_variant(value: &str, _node: &Node) -> BackendStyles {
    match value.to_ascii_lowercase().as_str() {
        "small-caps" => obj(json!({ "smallCaps": true })),
        "normal" => obj(json!({ "smallCaps": false })),
        _ => BackendStyles::new(),
    }
}

fn text_decoration(value: &str, _node: &Node) -> BackendStyles {
    let mut out = BackendStyles::new();
    for token in value.to_ascii_lowercase().split_whitespace() {
        match token {
            "underline" => {
                out.insert("underline".into(), json!({ "type": "single" }));
            }
            "line-through" => {
                out.insert("strike".into(), json!(true));
            }
            _ => {}
        }
    }
    out
}

fn text_transform(value: &str, _node: &Node) -> BackendStyles {
    match value.to_ascii_lowercase().as_str() {
        "uppercase" => obj(json!({ "allCaps": true })),
        "none" => obj(json!({ "allCaps": false })),
        _ => BackendStyles::new(),
    }
}

fn alignment(value: &str, node: &Node) -> BackendStyles {
    let Some(align) = text_align(value) else {
        return BackendStyles::new();
    };
    let align = if align == "justify" { "both" } else { align };
    match node.kind {
        NodeKind::Table => obj(json!({ "alignment": align })),
        _ if is_block(node) => obj(json!({ "alignment": align })),
        _ => BackendStyles::new(),
    }
}

fn text_indent(value: &str, node: &Node) -> BackendStyles {
    if !is_block(node) {
        return BackendStyles::new();
    }
    match Length::parse(value).and_then(|l| l.to_twips()) {
        Some(twips) if twips < 0 => nested(&["indent", "hanging"], json!(-twips)),
        Some(twips) => nested(&["indent", "firstLine"], json!(twips)),
        None => BackendStyles::new(),
    }
}

fn vertical_align(value: &str, node: &Node) -> BackendStyles {
    let value = value.to_ascii_lowercase();
    match node.kind {
        NodeKind::TableCell { .. } | NodeKind::TableRow => match value.as_str() {
            "top" => obj(json!({ "verticalAlign": "top" })),
            "middle" => obj(json!({ "verticalAlign": "center" })),
            "bottom" => obj(json!({ "verticalAlign": "bottom" })),
            _ => BackendStyles::new(),
        },
        NodeKind::Text => match value.as_str() {
            "super" => obj(json!({ "superScript": true })),
            "sub" => obj(json!({ "subScript": true })),
            _ => BackendStyles::new(),
        },
        _ => BackendStyles::new(),
    }
}

fn line_height(value: &str, _node: &Node) -> BackendStyles {
    let Some(length) = Length::parse(value) else {
        return BackendStyles::new();
    };
    let (line, rule) = match length.unit {
        Unit::None => ((length.value * 240.0).round() as i64, "auto"),
        Unit::Percent => {
            ((length.value / 100.0 * 240.0).round() as i64, "auto")
        }
        _ => match length.to_twips() {
            Some(twips) => (twips, "exact"),
            None => return BackendStyles::new(),
        },
    };
    obj(json!({ "spacing": { "line": line, "lineRule": rule } }))
}

fn letter_spacing(value: &str, node: &Node) -> BackendStyles {
    if node.kind != NodeKind::Text {
        return BackendStyles::new();
    }
    Length::parse(value)
        .and_then(|l| l.to_twips())
        .map(|twips| obj(json!({ "characterSpacing": twips })))
        .unwrap_or_default()
}

/// Table and cell widths: percent as fiftieths, `auto`, or absolute twips.
fn table_width(value: &str) -> Option<serde_json::Value> {
    if value.eq_ignore_ascii_case("auto") {
        return Some(json!({ "size": 0, "type": "auto" }));
    }
    let length = Length::parse(value)?;
    if length.is_percent() {
        let fiftieths = (length.value.clamp(0.0, 100.0) * 50.0).round() as i64;
        return Some(json!({ "size": fiftieths, "type": "pct" }));
    }
    length
        .to_twips()
        .map(|twips| json!({ "size": twips, "type": "dxa" }))
}

fn width(value: &str, node: &Node) -> BackendStyles {
    match node.kind {
        NodeKind::Table | NodeKind::TableCell { .. } => table_width(value)
            .map(|w| obj(json!({ "width": w })))
            .unwrap_or_default(),
        NodeKind::Image => image_dimension("width", value),
        _ => BackendStyles::new(),
    }
}

fn height(value: &str, node: &Node) -> BackendStyles {
    match node.kind {
        NodeKind::TableRow => Length::parse(value)
            .and_then(|l| l.to_twips())
            .map(|twips| obj(json!({ "height": { "value": twips, "rule": "atLeast" } })))
            .unwrap_or_default(),
        NodeKind::Image => image_dimension("height", value),
        _ => BackendStyles::new(),
    }
}

fn image_dimension(key: &str, value: &str) -> BackendStyles {
    Length::parse(value)
        .and_then(|l| l.to_px())
        .map(|px| nested(&["transformation", key], json!(px.round() as i64)))
        .unwrap_or_default()
}

fn margin(side: &str, value: &str, node: &Node) -> BackendStyles {
    let Some(twips) = Length::parse(value).and_then(|l| l.to_twips()) else {
        return BackendStyles::new();
    };
    match (&node.kind, side) {
        (NodeKind::Table, "left") => {
            obj(json!({ "indent": { "size": twips, "type": "dxa" } }))
        }
        (_, "top") if is_block(node) => nested(&["spacing", "before"], json!(twips)),
        (_, "bottom") if is_block(node) => nested(&["spacing", "after"], json!(twips)),
        (_, "left" | "right") if is_block(node) => nested(&["indent", side], json!(twips)),
        _ => BackendStyles::new(),
    }
}

fn padding(side: &str, value: &str, node: &Node) -> BackendStyles {
    if !matches!(node.kind, NodeKind::Table | NodeKind::TableCell { .. }) {
        return BackendStyles::new();
    }
    Length::parse(value)
        .and_then(|l| l.to_twips())
        .map(|twips| nested(&["margins", side], json!(twips)))
        .unwrap_or_default()
}

/// Border container key: tables and cells use per-side `borders`,
/// paragraphs use `border`. Runs and images carry no side borders.
fn border_key(node: &Node) -> Option<&'static str> {
    match node.kind {
        NodeKind::Table | NodeKind::TableCell { .. } => Some("borders"),
        _ if is_block(node) => Some("border"),
        _ => None,
    }
}

fn border_width(side: &str, value: &str, node: &Node) -> BackendStyles {
    let (Some(key), Some(size)) = (
        border_key(node),
        Length::parse_border_width(value).and_then(|l| l.to_eighth_points()),
    ) else {
        return BackendStyles::new();
    };
    nested(&[key, side, "size"], json!(size))
}

fn border_style(side: &str, value: &str, node: &Node) -> BackendStyles {
    let Some(key) = border_key(node) else {
        return BackendStyles::new();
    };
    let style = match value.to_ascii_lowercase().as_str() {
        "solid" => "single",
        "dashed" => "dashed",
        "dotted" => "dotted",
        "double" => "double",
        "groove" => "threeDEngrave",
        "ridge" => "threeDEmboss",
        "inset" => "inset",
        "outset" => "outset",
        "none" | "hidden" => "none",
        _ => return BackendStyles::new(),
    };
    nested(&[key, side, "style"], json!(style))
}

fn border_color(side: &str, value: &str, node: &Node) -> BackendStyles {
    let (Some(key), Some(hex)) = (border_key(node), hex_color(value)) else {
        return BackendStyles::new();
    };
    nested(&[key, side, "color"], json!(hex))
}

#[cfg(test)]
mod tests {
    use crate::model::{Node, NodeKind};
    use crate::style::StyleResolver;
    use serde_json::{json, Value};

    fn map(node: &Node) -> Value {
        Value::Object(StyleResolver::docx().map_styles(&node.styles, node))
    }

    #[test]
    fn test_run_properties() {
        let node = Node::text("x")
            .with_style("fontWeight", "bold")
            .with_style("fontStyle", "italic")
            .with_style("fontSize", "16px")
            .with_style("color", "red")
            .with_style("textDecoration", "underline line-through");
        assert_eq!(
            map(&node),
            json!({
                "bold": true,
                "italics": true,
                "size": 24,
                "color": "FF0000",
                "underline": {"type": "single"},
                "strike": true
            })
        );
    }

    #[test]
    fn test_width_depends_on_node_kind() {
        let table = Node::new(NodeKind::Table).with_style("width", "100%");
        assert_eq!(map(&table), json!({"width": {"size": 5000, "type": "pct"}}));

        let cell = Node::new(NodeKind::TableCell { header: false }).with_style("width", "1in");
        assert_eq!(map(&cell), json!({"width": {"size": 1440, "type": "dxa"}}));

        let image = Node::new(NodeKind::Image).with_style("width", "120px");
        assert_eq!(map(&image), json!({"transformation": {"width": 120}}));

        let para = Node::paragraph(vec![]).with_style("width", "50%");
        assert_eq!(map(&para), json!({}));
    }

    #[test]
    fn test_text_align_justify() {
        let para = Node::paragraph(vec![]).with_style("textAlign", "justify");
        assert_eq!(map(&para), json!({"alignment": "both"}));

        let text = Node::text("x").with_style("textAlign", "center");
        assert_eq!(map(&text), json!({}));
    }

    #[test]
    fn test_margins_merge_into_spacing() {
        let para = Node::paragraph(vec![]).with_style("margin", "12pt 0 6pt 0.5in");
        assert_eq!(
            map(&para),
            json!({
                "spacing": {"before": 240, "after": 120},
                "indent": {"left": 720, "right": 0}
            })
        );
    }

    #[test]
    fn test_vertical_align_context() {
        let cell = Node::new(NodeKind::TableCell { header: false }).with_style("verticalAlign", "middle");
        assert_eq!(map(&cell), json!({"verticalAlign": "center"}));
        let text = Node::text("2").with_style("verticalAlign", "super");
        assert_eq!(map(&text), json!({"superScript": true}));
    }

    #[test]
    fn test_paragraph_border() {
        let para = Node::paragraph(vec![]).with_style("borderBottom", "2px dashed #00f");
        assert_eq!(
            map(&para),
            json!({"border": {"bottom": {"size": 12, "style": "dashed", "color": "0000FF"}}})
        );
    }
}
