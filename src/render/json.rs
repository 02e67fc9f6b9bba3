//! JSON rendering: a dump of the element tree.

use crate::error::{Error, Result};
use crate::model::Node;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert element tree nodes to a JSON array.
pub fn to_json(nodes: &[Node], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(nodes),
        JsonFormat::Compact => serde_json::to_string(nodes),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
