//! Style resolution: shorthand expansion, property mapping and inheritance.

use super::mappings;
use super::merge::{deep_merge, BackendStyles};
use super::meta::{StyleMeta, StyleMetaRegistry};
use super::shorthand::expand_shorthands;
use crate::error::{Error, Result};
use crate::model::{Node, Scope, StyleMap};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps one raw property value to a backend style fragment.
///
/// The target node is passed so a mapper can branch on node kind: the
/// same CSS property means different things for tables, images and
/// paragraphs.
pub type PropertyMapper = Arc<dyn Fn(&str, &Node) -> BackendStyles + Send + Sync>;

/// Wrap a closure as a [`PropertyMapper`].
pub fn mapper<F>(f: F) -> PropertyMapper
where
    F: Fn(&str, &Node) -> BackendStyles + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Resolves raw node styles into backend style objects.
///
/// # Example
///
/// ```
/// use htmldoc::model::Node;
/// use htmldoc::style::StyleResolver;
///
/// let resolver = StyleResolver::docx();
/// let node = Node::text("Hi").with_style("fontWeight", "bold");
/// let mapped = resolver.map_styles(&node.styles, &node);
/// assert_eq!(mapped["bold"], true);
/// ```
#[derive(Clone)]
pub struct StyleResolver {
    mappers: HashMap<String, PropertyMapper>,
    meta: StyleMetaRegistry,
}

impl StyleResolver {
    /// Create a resolver with the built-in meta registry and no mappers.
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            meta: StyleMetaRegistry::builtin(),
        }
    }

    /// Create a resolver producing word-processor style objects.
    pub fn docx() -> Self {
        Self::with_table(mappings::docx::mappings())
    }

    /// Create a resolver producing PDF style objects.
    pub fn pdf() -> Self {
        Self::with_table(mappings::pdf::mappings())
    }

    /// Create a resolver producing Markdown formatting flags.
    pub fn markdown() -> Self {
        Self::with_table(mappings::markdown::mappings())
    }

    fn with_table(table: Vec<(&'static str, PropertyMapper)>) -> Self {
        let mut resolver = Self::new();
        for (property, mapper) in table {
            resolver.mappers.insert(property.to_string(), mapper);
        }
        resolver
    }

    /// Merge property mappers into this resolver; last registration per property wins.
    pub fn add_mapping<K, I>(&mut self, mappers: I) -> Result<()>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PropertyMapper)>,
    {
        for (property, mapper) in mappers {
            let property = property.into();
            if property.trim().is_empty() {
                return Err(Error::InvalidProperty(property));
            }
            self.mappers.insert(property, mapper);
        }
        Ok(())
    }

    /// Register inheritance metadata for a property; last registration wins.
    pub fn register_style_meta(&mut self, property: impl Into<String>, meta: StyleMeta) -> Result<()> {
        let property = property.into();
        if property.trim().is_empty() {
            return Err(Error::InvalidProperty(property));
        }
        self.meta.register(property, meta);
        Ok(())
    }

    /// Check if a mapper is registered for a property.
    pub fn has_mapping(&self, property: &str) -> bool {
        self.mappers.contains_key(property)
    }

    /// Get the meta registry.
    pub fn meta(&self) -> &StyleMetaRegistry {
        &self.meta
    }

    /// Map raw styles to a backend style object for `target`.
    ///
    /// Shorthands are expanded first. Each longhand with a registered mapper
    /// and a string value is mapped and deep-merged into the result in
    /// sorted property order. Unmapped properties are dropped.
    pub fn map_styles(&self, raw: &StyleMap, target: &Node) -> BackendStyles {
        let mut out = BackendStyles::new();
        if raw.is_empty() {
            return out;
        }

        for (property, value) in &expand_shorthands(raw) {
            let Some(mapper) = self.mappers.get(property) else {
                log::trace!("No mapper for style property {}", property);
                continue;
            };
            let Some(value) = value.as_str() else {
                continue;
            };
            deep_merge(&mut out, mapper(value.trim(), target));
        }

        out
    }

    /// Compute the styles a child at `child_scope` inherits from its parent.
    pub fn compute_inherited_styles(
        &self,
        parent_styles: &StyleMap,
        parent_scope: Scope,
        child_scope: Scope,
    ) -> StyleMap {
        self.meta
            .compute_inherited(parent_styles, parent_scope, child_scope)
    }

    /// Keep only the styles valid at `scope`.
    pub fn filter_for_scope(&self, styles: &StyleMap, scope: Scope) -> StyleMap {
        self.meta.filter_for_scope(styles, scope)
    }
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StyleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut properties: Vec<&String> = self.mappers.keys().collect();
        properties.sort();
        f.debug_struct("StyleResolver")
            .field("mappers", &properties)
            .field("meta", &self.meta)
            .finish()
    }
}
