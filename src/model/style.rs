//! Style and attribute value types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw CSS-like property values keyed by camelCase property name.
///
/// Keys iterate in sorted order, so two maps holding the same pairs always
/// behave identically regardless of insertion order.
pub type StyleMap = BTreeMap<String, StyleValue>;

/// Element attributes keyed by lower-cased attribute name.
pub type AttributeMap = BTreeMap<String, StyleValue>;

/// Largest span any attribute resolves to (the HTML `rowspan` limit).
pub const MAX_SPAN: usize = 65534;

/// A raw style or attribute value, either as written or numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Numeric value (spans, counts)
    Number(f64),
    /// String value as written in the source
    Str(String),
}

impl StyleValue {
    /// Get the string form if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            StyleValue::Number(_) => None,
        }
    }

    /// Get the numeric form, parsing string values when possible.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Get the value as a positive integer, as used for spans.
    ///
    /// Missing, invalid and non-positive values give 1; huge values are
    /// clamped to [`MAX_SPAN`].
    pub fn as_span(&self) -> usize {
        self.as_number()
            .filter(|n| !n.is_nan() && *n >= 1.0)
            .map(|n| n.min(MAX_SPAN as f64) as usize)
            .unwrap_or(1)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<usize> for StyleValue {
    fn from(value: usize) -> Self {
        StyleValue::Number(value as f64)
    }
}

/// Coarse category controlling where a style property applies and how it cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Paragraph-like containers
    Block,
    /// Text runs and inline images
    Inline,
    /// Table container
    Table,
    /// Table row
    TableRow,
    /// Table cell
    TableCell,
}

impl Scope {
    /// All scopes, in declaration order.
    pub const ALL: [Scope; 5] = [
        Scope::Block,
        Scope::Inline,
        Scope::Table,
        Scope::TableRow,
        Scope::TableCell,
    ];
}

/// Merge style layers in precedence order; later layers win per key.
///
/// Callers pass `[defaults, inherited, own]` to get the
/// default < inherited < own precedence the pipeline relies on.
pub fn layered(layers: &[&StyleMap]) -> StyleMap {
    let mut merged = StyleMap::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}
