//! Built-in property mapping tables, one per backend family.

pub mod docx;
pub mod markdown;
pub mod pdf;

use super::merge::BackendStyles;
use super::units::Rgb;
use serde_json::Value;

/// Longhand property names for one border side.
pub(crate) struct BorderSide {
    pub side: &'static str,
    pub width: &'static str,
    pub style: &'static str,
    pub color: &'static str,
}

pub(crate) const BORDER_SIDES: [BorderSide; 4] = [
    BorderSide {
        side: "top",
        width: "borderTopWidth",
        style: "borderTopStyle",
        color: "borderTopColor",
    },
    BorderSide {
        side: "right",
        width: "borderRightWidth",
        style: "borderRightStyle",
        color: "borderRightColor",
    },
    BorderSide {
        side: "bottom",
        width: "borderBottomWidth",
        style: "borderBottomStyle",
        color: "borderBottomColor",
    },
    BorderSide {
        side: "left",
        width: "borderLeftWidth",
        style: "borderLeftStyle",
        color: "borderLeftColor",
    },
];

pub(crate) const MARGIN_SIDES: [(&str, &str); 4] = [
    ("top", "marginTop"),
    ("right", "marginRight"),
    ("bottom", "marginBottom"),
    ("left", "marginLeft"),
];

pub(crate) const PADDING_SIDES: [(&str, &str); 4] = [
    ("top", "paddingTop"),
    ("right", "paddingRight"),
    ("bottom", "paddingBottom"),
    ("left", "paddingLeft"),
];

/// Convert a `json!` object literal to a style object (non-objects become empty).
pub(crate) fn obj(value: Value) -> BackendStyles {
    match value {
        Value::Object(map) => map,
        _ => BackendStyles::new(),
    }
}

/// Build a nested object from a key path and a leaf value.
pub(crate) fn nested(path: &[&str], leaf: Value) -> BackendStyles {
    let mut value = leaf;
    for key in path.iter().rev() {
        let mut map = BackendStyles::new();
        map.insert((*key).to_string(), value);
        value = Value::Object(map);
    }
    obj(value)
}

pub(crate) fn is_bold(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "bold" | "bolder" => Some(true),
        "normal" | "lighter" => Some(false),
        other => other.parse::<u16>().ok().map(|w| w >= 600),
    }
}

pub(crate) fn is_italic(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "italic" | "oblique" => Some(true),
        "normal" => Some(false),
        _ => None,
    }
}

/// First family of a `font-family` list, unquoted.
pub(crate) fn first_family(value: &str) -> Option<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .find(|f| !f.is_empty())
        .map(str::to_string)
}

pub(crate) fn hex_color(value: &str) -> Option<String> {
    Rgb::parse(value).map(|rgb| rgb.to_hex())
}

pub(crate) fn css_color(value: &str) -> Option<String> {
    Rgb::parse(value).map(|rgb| rgb.to_css())
}

/// Canonical `textAlign` keyword.
pub(crate) fn text_align(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "left" | "start" => Some("left"),
        "right" | "end" => Some("right"),
        "center" => Some("center"),
        "justify" => Some("justify"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested() {
        assert_eq!(
            Value::Object(nested(&["a", "b"], json!(1))),
            json!({"a": {"b": 1}})
        );
    }

    #[test]
    fn test_font_helpers() {
        assert_eq!(is_bold("700"), Some(true));
        assert_eq!(is_bold("400"), Some(false));
        assert_eq!(is_bold("weird"), None);
        assert_eq!(is_italic("oblique"), Some(true));
        assert_eq!(
            first_family("'Times New Roman', serif").as_deref(),
            Some("Times New Roman")
        );
        assert_eq!(text_align("start"), Some("left"));
    }
}
