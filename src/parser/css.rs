//! Inline `style` attribute parsing.

use crate::model::{StyleMap, StyleValue};
use regex::Regex;
use std::sync::OnceLock;

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").unwrap())
}

fn important_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s*!\s*important\s*$").unwrap())
}

/// Parse a `style` attribute into camelCase properties.
///
/// Declarations are split on `;` outside parentheses and quotes, so values
/// such as `url(data:image/png;base64,...)` survive intact. Later
/// declarations of the same property win.
pub fn parse_inline_style(input: &str) -> StyleMap {
    let cleaned = comment_regex().replace_all(input, "");
    let mut styles = StyleMap::new();

    for declaration in split_declarations(&cleaned) {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = important_regex().replace(value.trim(), "");
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        styles.insert(kebab_to_camel(&property), StyleValue::Str(value.to_string()));
    }

    styles
}

fn split_declarations(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Convert a CSS property name to camelCase (`border-top-width` → `borderTopWidth`).
///
/// Custom properties (`--name`) are returned unchanged.
pub fn kebab_to_camel(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for (i, ch) in property.chars().enumerate() {
        if ch == '-' {
            upper = i > 0;
            continue;
        }
        if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_to_camel() {
        assert_eq!(kebab_to_camel("font-weight"), "fontWeight");
        assert_eq!(kebab_to_camel("border-top-width"), "borderTopWidth");
        assert_eq!(kebab_to_camel("color"), "color");
        assert_eq!(kebab_to_camel("-webkit-box-shadow"), "webkitBoxShadow");
        assert_eq!(kebab_to_camel("--brand"), "--brand");
    }

    #[test]
    fn test_parse_inline_style() {
        let styles = parse_inline_style("Font-Weight: bold; color:red !important;;  ; margin: 0 auto");
        assert_eq!(styles.get("fontWeight").and_then(|v| v.as_str()), Some("bold"));
        assert_eq!(styles.get("color").and_then(|v| v.as_str()), Some("red"));
        assert_eq!(styles.get("margin").and_then(|v| v.as_str()), Some("0 auto"));
        assert_eq!(styles.len(), 3);
    }

    #[test]
    fn test_semicolons_inside_parens_and_comments() {
        let styles = parse_inline_style(
            "background-image: url(data:image/png;base64,AAA); /* note; here */ color: blue",
        );
        assert_eq!(
            styles.get("backgroundImage").and_then(|v| v.as_str()),
            Some("url(data:image/png;base64,AAA)")
        );
        assert_eq!(styles.get("color").and_then(|v| v.as_str()), Some("blue"));
    }

    #[test]
    fn test_malformed_declarations_ignored() {
        let styles = parse_inline_style("color; : red; width:");
        assert!(styles.is_empty());
    }
}
