//! Shorthand expansion into longhand properties.
//!
//! Expansion runs in a fixed order (`border`, then `borderTop` and friends,
//! then `borderWidth`/`margin`/...) and never overwrites a key that is
//! already present. The more specific declaration therefore wins no matter
//! how the input map was built.

use super::units::{Length, Rgb};
use crate::model::{StyleMap, StyleValue};

const SIDES: [&str; 4] = ["Top", "Right", "Bottom", "Left"];

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Box shorthands expanded with the 1-4 value syntax: (shorthand, prefix, suffix).
const BOX_SHORTHANDS: &[(&str, &str, &str)] = &[
    ("borderWidth", "border", "Width"),
    ("borderStyle", "border", "Style"),
    ("borderColor", "border", "Color"),
    ("margin", "margin", ""),
    ("padding", "padding", ""),
];

/// Check if a property is a shorthand this module expands.
pub fn is_shorthand(property: &str) -> bool {
    property == "border"
        || SIDES.iter().any(|side| property == format!("border{}", side))
        || BOX_SHORTHANDS.iter().any(|(name, _, _)| *name == property)
}

/// Expand all supported shorthands into longhands.
///
/// Shorthand keys are removed from the result. Numeric values pass
/// through untouched since shorthands are always written as strings.
pub fn expand_shorthands(styles: &StyleMap) -> StyleMap {
    let mut out: StyleMap = styles
        .iter()
        .filter(|(key, _)| !is_shorthand(key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    // Stage 1: `border` fills the directional borders that were not given.
    let mut sides: Vec<(String, String)> = Vec::new();
    for side in SIDES {
        let key = format!("border{}", side);
        let value = styles
            .get(&key)
            .or_else(|| styles.get("border"))
            .and_then(|v| v.as_str());
        if let Some(value) = value {
            sides.push((side.to_string(), value.to_string()));
        }
    }

    // Stage 2: directional borders expand into width/style/color.
    for (side, value) in &sides {
        let (width, style, color) = split_border(value);
        for (suffix, part) in [("Width", width), ("Style", style), ("Color", color)] {
            if let Some(part) = part {
                insert_absent(&mut out, format!("border{}{}", side, suffix), part);
            }
        }
    }

    // Stage 3: box shorthands.
    for (shorthand, prefix, suffix) in BOX_SHORTHANDS {
        let Some(value) = styles.get(*shorthand).and_then(|v| v.as_str()) else {
            continue;
        };
        match split_box(value) {
            Some(parts) => {
                for (side, part) in SIDES.iter().zip(parts) {
                    insert_absent(&mut out, format!("{}{}{}", prefix, side, suffix), part);
                }
            }
            None => log::trace!("Ignoring malformed {} value: {:?}", shorthand, value),
        }
    }

    out
}

fn insert_absent(out: &mut StyleMap, key: String, value: String) {
    out.entry(key).or_insert(StyleValue::Str(value));
}

/// Split a border value such as `1px solid #000` into (width, style, color).
pub fn split_border(value: &str) -> (Option<String>, Option<String>, Option<String>) {
    let mut width = None;
    let mut style = None;
    let mut color = None;

    for token in tokenize(value) {
        let lower = token.to_ascii_lowercase();
        if style.is_none() && BORDER_STYLES.contains(&lower.as_str()) {
            style = Some(lower);
        } else if width.is_none() && Length::parse_border_width(&token).is_some() {
            width = Some(token);
        } else if color.is_none() && Rgb::parse(&token).is_some() {
            color = Some(token);
        } else {
            log::trace!("Unrecognized border token: {:?}", token);
        }
    }

    (width, style, color)
}

/// Split a 1-4 value box shorthand into [top, right, bottom, left].
fn split_box(value: &str) -> Option<[String; 4]> {
    let parts = tokenize(value);
    let [top, right, bottom, left] = match parts.as_slice() {
        [a] => [a, a, a, a],
        [a, b] => [a, b, a, b],
        [a, b, c] => [a, b, c, b],
        [a, b, c, d] => [a, b, c, d],
        _ => return None,
    };
    Some([top.clone(), right.clone(), bottom.clone(), left.clone()])
}

/// Split on whitespace while keeping `rgb(...)` groups intact.
fn tokenize(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in value.trim().chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
