//! PDF mapping table.
//!
//! Lengths become points, colors lower-case CSS hex. Percent widths are kept
//! as percent strings for the layout engine to resolve.

use super::{
    css_color, first_family, is_bold, is_italic, nested, obj, text_align, BORDER_SIDES,
    MARGIN_SIDES, PADDING_SIDES,
};
use crate::model::{Node, NodeKind, Scope};
use crate::style::merge::{deep_merge, BackendStyles};
use crate::style::resolver::{mapper, PropertyMapper};
use crate::style::units::{Length, Unit, BASE_FONT_PX};
use serde_json::json;

/// Build the PDF mapping table.
pub fn mappings() -> Vec<(&'static str, PropertyMapper)> {
    let mut table: Vec<(&'static str, PropertyMapper)> = vec![
        ("color", mapper(color)),
        ("backgroundColor", mapper(background_color)),
        ("fontWeight", mapper(font_weight)),
        ("fontStyle", mapper(font_style)),
        ("fontSize", mapper(font_size)),
        ("fontFamily", mapper(font_family)),
        ("textDecoration", mapper(text_decoration)),
        ("textDecorationLine", mapper(text_decoration)),
        ("textAlign", mapper(alignment)),
        ("verticalAlign", mapper(vertical_align)),
        ("lineHeight", mapper(line_height)),
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
        table.push((property, mapper(move |v, n| spacing("margin", side, v, n))));
    }
    for (side, property) in PADDING_SIDES {
        table.push((property, mapper(move |v, n| spacing("padding", side, v, n))));
    }

    table
}

fn points(value: &str) -> Option<f64> {
    Length::parse(value)
        .and_then(|l| l.to_points())
        .map(|pt| (pt * 100.0).round() / 100.0)
}

fn color(value: &str, _node: &Node) -> BackendStyles {
    css_color(value)
        .map(|c| obj(json!({ "color": c })))
        .unwrap_or_default()
}

fn background_color(value: &str, node: &Node) -> BackendStyles {
    let Some(c) = css_color(value) else {
        return BackendStyles::new();
    };
    match node.kind {
        NodeKind::TableCell { .. } | NodeKind::TableRow => obj(json!({ "fillColor": c })),
        _ => obj(json!({ "background": c })),
    }
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
    let length = if length.is_percent() {
        Length {
            value: length.value / 100.0 * BASE_FONT_PX,
            unit: Unit::Px,
        }
    } else {
        length
    };
    length
        .to_points()
        .map(|pt| obj(json!({ "fontSize": (pt * 100.0).round() / 100.0 })))
        .unwrap_or_default()
}

fn font_family(value: &str, _node: &Node) -> BackendStyles {
    first_family(value)
        .map(|font| obj(json!({ "font": font })))
        .unwrap_or_default()
}

fn text_decoration(value: &str, _node: &Node) -> BackendStyles {
    let value = value.to_ascii_lowercase();
    let decoration = value.split_whitespace().find_map(|token| match token {
        "underline" => Some("underline"),
        "line-through" => Some("lineThrough"),
        "overline" => Some("overline"),
        _ => None,
    });
    decoration
        .map(|d| obj(json!({ "decoration": d })))
        .unwrap_or_default()
}

fn alignment(value: &str, node: &Node) -> BackendStyles {
    if node.scope() == Scope::Inline {
        return BackendStyles::new();
    }
    text_align(value)
        .map(|align| obj(json!({ "alignment": align })))
        .unwrap_or_default()
}

fn vertical_align(value: &str, node: &Node) -> BackendStyles {
    let value = value.to_ascii_lowercase();
    match (&node.kind, value.as_str()) {
        (NodeKind::Text, "super") => obj(json!({ "sup": true })),
        (NodeKind::Text, "sub") => obj(json!({ "sub": true })),
        (NodeKind::TableCell { .. }, "top" | "middle" | "bottom") => {
            obj(json!({ "verticalAlignment": value }))
        }
        _ => BackendStyles::new(),
    }
}

fn line_height(value: &str, _node: &Node) -> BackendStyles {
    let Some(length) = Length::parse(value) else {
        return BackendStyles::new();
    };
    let factor = match length.unit {
        Unit::None => length.value,
        Unit::Percent => length.value / 100.0,
        _ => match length.to_px() {
            Some(px) => px / BASE_FONT_PX,
            None => return BackendStyles::new(),
        },
    };
    obj(json!({ "lineHeight": (factor * 100.0).round() / 100.0 }))
}

fn dimension(value: &str) -> Option<serde_json::Value> {
    if value.eq_ignore_ascii_case("auto") {
        return Some(json!("auto"));
    }
    let length = Length::parse(value)?;
    if length.is_percent() {
        return Some(json!(format!("{}%", length.value)));
    }
    points(value).map(|pt| json!(pt))
}

fn width(value: &str, node: &Node) -> BackendStyles {
    match node.kind {
        NodeKind::Table | NodeKind::TableCell { .. } | NodeKind::Image => dimension(value)
            .map(|w| obj(json!({ "width": w })))
            .unwrap_or_default(),
        _ => BackendStyles::new(),
    }
}

fn height(value: &str, node: &Node) -> BackendStyles {
    match node.kind {
        NodeKind::TableRow | NodeKind::Image => dimension(value)
            .map(|h| obj(json!({ "height": h })))
            .unwrap_or_default(),
        _ => BackendStyles::new(),
    }
}

fn spacing(kind: &str, side: &str, value: &str, node: &Node) -> BackendStyles {
    if node.scope() == Scope::Inline && kind == "padding" {
        return BackendStyles::new();
    }
    points(value)
        .map(|pt| nested(&[kind, side], json!(pt)))
        .unwrap_or_default()
}

fn border_width(side: &str, value: &str, node: &Node) -> BackendStyles {
    if node.scope() == Scope::Inline {
        return BackendStyles::new();
    }
    Length::parse_border_width(value)
        .and_then(|l| l.to_points())
        .map(|pt| nested(&["border", side, "width"], json!(pt)))
        .unwrap_or_default()
}

fn border_style(side: &str, value: &str, node: &Node) -> BackendStyles {
    if node.scope() == Scope::Inline {
        return BackendStyles::new();
    }
    let value = value.to_ascii_lowercase();
    let visible = !matches!(value.as_str(), "none" | "hidden");
    let mut out = nested(&["border", side, "visible"], json!(visible));
    if visible {
        deep_merge(
            &mut out,
            nested(&["border", side, "dash"], json!(matches!(value.as_str(), "dashed" | "dotted"))),
        );
    }
    out
}

fn border_color(side: &str, value: &str, node: &Node) -> BackendStyles {
    if node.scope() == Scope::Inline {
        return BackendStyles::new();
    }
    css_color(value)
        .map(|c| nested(&["border", side, "color"], json!(c)))
        .unwrap_or_default()
}
