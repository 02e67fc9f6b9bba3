//! Style property metadata: inheritance, valid scopes and cascade targets.

use crate::model::{Scope, StyleMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Inheritance and scope rules for one style property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleMeta {
    /// Whether descendants inherit the property
    pub inherits: bool,

    /// Scopes the property is valid at
    pub scopes: BTreeSet<Scope>,

    /// Scopes the property cascades into (defaults to `scopes`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_to: Option<BTreeSet<Scope>>,
}

impl StyleMeta {
    /// Create an inheriting property valid at the given scopes.
    pub fn inherited(scopes: &[Scope]) -> Self {
        Self {
            inherits: true,
            scopes: scopes.iter().copied().collect(),
            cascade_to: None,
        }
    }

    /// Create a non-inheriting property valid at the given scopes.
    pub fn local(scopes: &[Scope]) -> Self {
        Self {
            inherits: false,
            scopes: scopes.iter().copied().collect(),
            cascade_to: None,
        }
    }

    /// Restrict the scopes this property cascades into.
    pub fn with_cascade_to(mut self, scopes: &[Scope]) -> Self {
        self.cascade_to = Some(scopes.iter().copied().collect());
        self
    }

    /// Check if a value set at `parent` flows down to a child at `child`.
    pub fn cascades(&self, parent: Scope, child: Scope) -> bool {
        self.inherits
            && self.scopes.contains(&parent)
            && self
                .cascade_to
                .as_ref()
                .unwrap_or(&self.scopes)
                .contains(&child)
    }
}

impl Default for StyleMeta {
    /// Unregistered properties: not inherited, valid everywhere.
    fn default() -> Self {
        Self::local(&Scope::ALL)
    }
}

const TEXT_PROPERTIES: &[&str] = &[
    "color",
    "direction",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontVariant",
    "fontWeight",
    "letterSpacing",
    "textDecoration",
    "textDecorationLine",
    "textTransform",
    "visibility",
    "whiteSpace",
    "wordSpacing",
];

const PARAGRAPH_PROPERTIES: &[&str] = &["lineHeight", "textAlign", "textIndent"];

/// Registry of style property metadata.
#[derive(Debug, Clone, Default)]
pub struct StyleMetaRegistry {
    entries: HashMap<String, StyleMeta>,
}

impl StyleMetaRegistry {
    /// Create an empty registry; every property gets the permissive default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in property table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        for prop in TEXT_PROPERTIES {
            registry.register(*prop, StyleMeta::inherited(&Scope::ALL));
        }
        for prop in PARAGRAPH_PROPERTIES {
            registry.register(
                *prop,
                StyleMeta::inherited(&[
                    Scope::Block,
                    Scope::Table,
                    Scope::TableRow,
                    Scope::TableCell,
                ]),
            );
        }

        // Row-level vertical alignment reaches cells; on runs it means sup/sub.
        registry.register(
            "verticalAlign",
            StyleMeta::inherited(&[Scope::Inline, Scope::TableRow, Scope::TableCell])
                .with_cascade_to(&[Scope::TableCell]),
        );
        registry.register(
            "backgroundColor",
            StyleMeta::inherited(&Scope::ALL).with_cascade_to(&[Scope::TableCell]),
        );

        registry
    }

    /// Register metadata for a property; last registration wins.
    pub fn register(&mut self, property: impl Into<String>, meta: StyleMeta) {
        self.entries.insert(property.into(), meta);
    }

    /// Get metadata for a property, falling back to the permissive default.
    pub fn get(&self, property: &str) -> StyleMeta {
        self.entries.get(property).cloned().unwrap_or_default()
    }

    /// Check if a property has registered metadata.
    pub fn contains(&self, property: &str) -> bool {
        self.entries.contains_key(property)
    }

    /// Compute the styles a child at `child_scope` inherits from its parent.
    pub fn compute_inherited(
        &self,
        parent_styles: &StyleMap,
        parent_scope: Scope,
        child_scope: Scope,
    ) -> StyleMap {
        parent_styles
            .iter()
            .filter(|(prop, _)| self.get(prop).cascades(parent_scope, child_scope))
            .map(|(prop, value)| (prop.clone(), value.clone()))
            .collect()
    }

    /// Keep only the styles valid at `scope`.
    pub fn filter_for_scope(&self, styles: &StyleMap, scope: Scope) -> StyleMap {
        styles
            .iter()
            .filter(|(prop, _)| match self.entries.get(prop.as_str()) {
                Some(meta) => meta.scopes.contains(&scope),
                None => true,
            })
            .map(|(prop, value)| (prop.clone(), value.clone()))
            .collect()
    }
}
