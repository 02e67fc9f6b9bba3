//! Converter registry and tree walk.

use super::converter::{Backend, ElementConverter, FallthroughConverter, Rule, Wrap};
use crate::model::{layered, Node, Scope, StyleMap};
use crate::style::{BackendStyles, StyleResolver};

static NO_STYLES: StyleMap = StyleMap::new();

type BlockConverter<B> = Box<dyn ElementConverter<B, <B as Backend>::Block>>;
type InlineConverter<B> = Box<dyn ElementConverter<B, <B as Backend>::Inline>>;

/// Cascaded styles and scope of the node whose children are being converted.
#[derive(Debug, Clone, Copy)]
pub struct Parent<'a> {
    /// The parent's cascaded styles
    pub styles: &'a StyleMap,
    /// The parent's scope
    pub scope: Scope,
}

impl<'a> Parent<'a> {
    /// The virtual parent of top-level nodes: no styles, block scope.
    pub fn root() -> Parent<'static> {
        Parent {
            styles: &NO_STYLES,
            scope: Scope::Block,
        }
    }

    /// Parent context for the children of `node`.
    pub fn of(node: &Node, cascaded: &'a StyleMap) -> Self {
        Self {
            styles: cascaded,
            scope: node.scope(),
        }
    }
}

/// Element conversion dispatcher for one backend.
///
/// Block and inline conversion pick the first matching converter, user
/// registrations before built-ins; a node nothing matches converts to an
/// empty output. Fallthrough converters then all run over that output in
/// registration order.
pub struct Dispatcher<B: Backend> {
    backend: B,
    resolver: StyleResolver,
    blocks: Vec<BlockConverter<B>>,
    builtin_blocks: Vec<BlockConverter<B>>,
    inlines: Vec<InlineConverter<B>>,
    builtin_inlines: Vec<InlineConverter<B>>,
    fallthroughs: Vec<Box<dyn FallthroughConverter<B>>>,
}

impl<B: Backend> Dispatcher<B> {
    /// Create a dispatcher with no converters.
    pub fn new(backend: B, resolver: StyleResolver) -> Self {
        Self {
            backend,
            resolver,
            blocks: Vec::new(),
            builtin_blocks: Vec::new(),
            inlines: Vec::new(),
            builtin_inlines: Vec::new(),
            fallthroughs: Vec::new(),
        }
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Get the style resolver.
    pub fn resolver(&self) -> &StyleResolver {
        &self.resolver
    }

    /// Get the style resolver for registration.
    pub fn resolver_mut(&mut self) -> &mut StyleResolver {
        &mut self.resolver
    }

    /// Register a user block converter (checked before built-ins).
    pub fn add_block_converter(&mut self, converter: impl ElementConverter<B, B::Block> + 'static) {
        self.blocks.push(Box::new(converter));
    }

    /// Register a user inline converter (checked before built-ins).
    pub fn add_inline_converter(&mut self, converter: impl ElementConverter<B, B::Inline> + 'static) {
        self.inlines.push(Box::new(converter));
    }

    /// Register a built-in block converter.
    pub fn add_builtin_block_converter(
        &mut self,
        converter: impl ElementConverter<B, B::Block> + 'static,
    ) {
        self.builtin_blocks.push(Box::new(converter));
    }

    /// Register a built-in inline converter.
    pub fn add_builtin_inline_converter(
        &mut self,
        converter: impl ElementConverter<B, B::Inline> + 'static,
    ) {
        self.builtin_inlines.push(Box::new(converter));
    }

    /// Register a fallthrough converter.
    pub fn add_fallthrough(&mut self, converter: impl FallthroughConverter<B> + 'static) {
        self.fallthroughs.push(Box::new(converter));
    }

    /// Register a user block converter from closures.
    pub fn add_block_rule<P, F>(&mut self, predicate: P, convert: F)
    where
        B: 'static,
        B::Block: 'static,
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Dispatcher<B>, &Node, &StyleMap) -> Vec<B::Block> + Send + Sync + 'static,
    {
        self.add_block_converter(Rule::new(predicate, convert));
    }

    /// Register a user inline converter from closures.
    pub fn add_inline_rule<P, F>(&mut self, predicate: P, convert: F)
    where
        B: 'static,
        B::Inline: 'static,
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Dispatcher<B>, &Node, &StyleMap) -> Vec<B::Inline> + Send + Sync + 'static,
    {
        self.add_inline_converter(Rule::new(predicate, convert));
    }

    /// Register a block-wrapping fallthrough from closures.
    pub fn add_wrap_rule<P, F>(&mut self, predicate: P, wrap: F)
    where
        B: 'static,
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Dispatcher<B>, &Node, Vec<B::Block>) -> Vec<B::Block> + Send + Sync + 'static,
    {
        self.add_fallthrough(Wrap::new(predicate, wrap));
    }

    /// Convert top-level nodes to blocks, in order.
    pub fn convert(&self, nodes: &[Node]) -> Vec<B::Block> {
        nodes
            .iter()
            .flat_map(|node| self.convert_block(node, Parent::root()))
            .collect()
    }

    /// Styles a node is converted with: inherited from `parent` < own.
    pub fn cascade(&self, node: &Node, parent: Parent<'_>) -> StyleMap {
        let scope = node.scope();
        let inherited = self
            .resolver
            .compute_inherited_styles(parent.styles, parent.scope, scope);
        let own = self.resolver.filter_for_scope(&node.styles, scope);
        layered(&[&inherited, &own])
    }

    /// Map cascaded styles through the resolver for `node`.
    pub fn map_styles(&self, cascaded: &StyleMap, node: &Node) -> BackendStyles {
        self.resolver.map_styles(cascaded, node)
    }

    /// Convert one node to blocks.
    pub fn convert_block(&self, node: &Node, parent: Parent<'_>) -> Vec<B::Block> {
        let cascaded = self.cascade(node, parent);
        let output = match self
            .blocks
            .iter()
            .chain(&self.builtin_blocks)
            .find(|c| c.is_match(node))
        {
            Some(converter) => converter.convert(self, node, &cascaded),
            None => {
                log::trace!("No block converter for {:?}", node.kind);
                Vec::new()
            }
        };
        self.fallthroughs
            .iter()
            .filter(|f| f.is_match(node))
            .fold(output, |acc, f| f.wrap_blocks(self, node, acc))
    }

    /// Convert one node to inlines.
    pub fn convert_inline(&self, node: &Node, parent: Parent<'_>) -> Vec<B::Inline> {
        let cascaded = self.cascade(node, parent);
        let output = match self
            .inlines
            .iter()
            .chain(&self.builtin_inlines)
            .find(|c| c.is_match(node))
        {
            Some(converter) => converter.convert(self, node, &cascaded),
            None => {
                log::trace!("No inline converter for {:?}", node.kind);
                Vec::new()
            }
        };
        self.fallthroughs
            .iter()
            .filter(|f| f.is_match(node))
            .fold(output, |acc, f| f.wrap_inlines(self, node, acc))
    }

    /// Convert the children of `node` to inlines.
    pub fn convert_inline_children(&self, node: &Node, cascaded: &StyleMap) -> Vec<B::Inline> {
        let parent = Parent::of(node, cascaded);
        match (&node.text, node.content.is_empty()) {
            (Some(text), true) => self.convert_inline(&Node::text(text.clone()), parent),
            _ => node
                .content
                .iter()
                .flat_map(|child| self.convert_inline(child, parent))
                .collect(),
        }
    }

    /// Convert the children of `node` into a block sequence.
    ///
    /// Consecutive inline children are gathered into one chunk and turned
    /// into a single block by `wrap`; other children are converted by
    /// `convert_block` (or [`convert_block`](Self::convert_block) when
    /// `None`). A node with text but no children converts as if it held one
    /// text run.
    ///
    /// With `inline_paragraphs`, paragraph children are converted inline
    /// into the surrounding chunk. A line break goes before such a
    /// paragraph unless it is the first child or follows another
    /// paragraph, and after it unless it is the last child.
    pub fn convert_to_blocks<W>(
        &self,
        node: &Node,
        cascaded: &StyleMap,
        wrap: W,
        convert_block: Option<&dyn Fn(&Node, Parent<'_>) -> Vec<B::Block>>,
        inline_paragraphs: bool,
    ) -> Vec<B::Block>
    where
        W: Fn(Vec<B::Inline>) -> B::Block,
    {
        let parent = Parent::of(node, cascaded);
        let synthesized;
        let children: &[Node] = match (&node.text, node.content.is_empty()) {
            (Some(text), true) => {
                synthesized = [Node::text(text.clone())];
                &synthesized
            }
            _ => &node.content,
        };

        let mut blocks = Vec::new();
        let mut chunk: Vec<B::Inline> = Vec::new();
        let last = children.len().saturating_sub(1);

        for (i, child) in children.iter().enumerate() {
            if child.is_inline() {
                chunk.extend(self.convert_inline(child, parent));
                continue;
            }
            if inline_paragraphs && child.is_paragraph() {
                let after_paragraph = i > 0 && children[i - 1].is_paragraph();
                if i > 0 && !after_paragraph {
                    chunk.push(self.backend.line_break());
                }
                chunk.extend(self.convert_inline(child, parent));
                if i < last {
                    chunk.push(self.backend.line_break());
                }
                continue;
            }
            if !chunk.is_empty() {
                blocks.push(wrap(std::mem::take(&mut chunk)));
            }
            match convert_block {
                Some(convert) => blocks.extend(convert(child, parent)),
                None => blocks.extend(self.convert_block(child, parent)),
            }
        }
        if !chunk.is_empty() {
            blocks.push(wrap(chunk));
        }
        blocks
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("backend", &self.backend)
            .field("resolver", &self.resolver)
            .field("blocks", &(self.blocks.len() + self.builtin_blocks.len()))
            .field("inlines", &(self.inlines.len() + self.builtin_inlines.len()))
            .field("fallthroughs", &self.fallthroughs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    /// Test backend: blocks and inlines are strings.
    #[derive(Debug)]
    struct Echo;

    impl Backend for Echo {
        type Block = String;
        type Inline = String;

        fn line_break(&self) -> String {
            "<br>".to_string()
        }
    }

    fn dispatcher() -> Dispatcher<Echo> {
        let mut d = Dispatcher::new(Echo, StyleResolver::new());
        d.add_builtin_inline_converter(Rule::new(
            |n: &Node| n.kind == NodeKind::Text,
            |_: &Dispatcher<Echo>, n: &Node, _: &StyleMap| vec![n.text.clone().unwrap_or_default()],
        ));
        d.add_builtin_inline_converter(Rule::new(
            |n: &Node| n.is_paragraph(),
            |d: &Dispatcher<Echo>, n: &Node, c: &StyleMap| d.convert_inline_children(n, c),
        ));
        d.add_builtin_block_converter(Rule::new(
            |n: &Node| n.is_paragraph(),
            |d: &Dispatcher<Echo>, n: &Node, c: &StyleMap| {
                d.convert_to_blocks(n, c, |runs| format!("[{}]", runs.concat()), None, false)
            },
        ));
        d
    }

    #[test]
    fn test_no_match_is_empty() {
        let d = dispatcher();
        assert!(d.convert(&[Node::new(NodeKind::Custom)]).is_empty());
    }

    #[test]
    fn test_user_converter_wins() {
        let mut d = dispatcher();
        d.add_block_rule(|n| n.is_paragraph(), |_, _, _| vec!["user".to_string()]);
        assert_eq!(d.convert(&[Node::paragraph(vec![])]), vec!["user"]);
    }

    #[test]
    fn test_inline_runs_chunked() {
        let d = dispatcher();
        let node = Node::paragraph(vec![
            Node::text("a"),
            Node::text("b"),
            Node::paragraph(vec![Node::text("c")]),
            Node::text("d"),
        ]);
        assert_eq!(d.convert(&[node]), vec!["[ab]", "[c]", "[d]"]);
    }

    #[test]
    fn test_text_only_node_synthesizes_run() {
        let d = dispatcher();
        assert_eq!(
            d.convert(&[Node::new(NodeKind::Paragraph).with_text("t")]),
            vec!["[t]"]
        );
    }

    #[test]
    fn test_inline_paragraph_breaks() {
        let d = dispatcher();
        let node = Node::new(NodeKind::ListItem).with_content(vec![
            Node::text("a"),
            Node::paragraph(vec![Node::text("p1")]),
            Node::paragraph(vec![Node::text("p2")]),
            Node::text("z"),
        ]);
        let out = d.convert_to_blocks(&node, &StyleMap::new(), |r| r.concat(), None, true);
        assert_eq!(out, vec!["a<br>p1<br>p2<br>z"]);

        let first = Node::new(NodeKind::ListItem)
            .with_content(vec![Node::paragraph(vec![Node::text("only")])]);
        let out = d.convert_to_blocks(&first, &StyleMap::new(), |r| r.concat(), None, true);
        assert_eq!(out, vec!["only"]);
    }

    #[test]
    fn test_fallthroughs_fold_in_order() {
        let mut d = dispatcher();
        d.add_wrap_rule(
            |n| n.is_paragraph(),
            |_, _, blocks| blocks.into_iter().map(|b| format!("1{}", b)).collect(),
        );
        d.add_wrap_rule(
            |n| n.is_paragraph(),
            |_, _, blocks| blocks.into_iter().map(|b| format!("2{}", b)).collect(),
        );
        assert_eq!(
            d.convert(&[Node::paragraph(vec![Node::text("x")])]),
            vec!["21[x]"]
        );
    }

    #[test]
    fn test_cascade_inherits_text_styles() {
        let d = dispatcher();
        let parent = Node::paragraph(vec![]).with_style("color", "red");
        let child = Node::text("x").with_style("fontWeight", "bold");
        let parent_cascaded = d.cascade(&parent, Parent::root());
        let cascaded = d.cascade(&child, Parent::of(&parent, &parent_cascaded));
        assert_eq!(cascaded.get("color").and_then(|v| v.as_str()), Some("red"));
        assert_eq!(
            cascaded.get("fontWeight").and_then(|v| v.as_str()),
            Some("bold")
        );
    }
}
