//! Converter traits and closure-backed converters.

use super::Dispatcher;
use crate::model::{Node, StyleMap};
use std::marker::PhantomData;

/// Output types of a conversion target.
pub trait Backend: Send + Sync {
    /// Block-level output node (paragraph, table, ...)
    type Block;
    /// Run-level output node (text run, inline image, ...)
    type Inline;

    /// The explicit line-break run.
    fn line_break(&self) -> Self::Inline;
}

/// Converts matching element tree nodes into backend output nodes.
///
/// `cascaded` holds the node's own styles layered over what it inherits
/// from its ancestors.
pub trait ElementConverter<B: Backend, O>: Send + Sync {
    /// Check if this converter handles `node`.
    fn is_match(&self, node: &Node) -> bool;

    /// Convert `node`.
    fn convert(&self, deps: &Dispatcher<B>, node: &Node, cascaded: &StyleMap) -> Vec<O>;
}

/// Cross-cutting rule applied after the primary converter.
///
/// Every matching fallthrough runs, in registration order, each receiving
/// the previous stage's output.
pub trait FallthroughConverter<B: Backend>: Send + Sync {
    /// Check if this rule applies to `node`.
    fn is_match(&self, node: &Node) -> bool;

    /// Transform the block output for `node`.
    fn wrap_blocks(
        &self,
        _deps: &Dispatcher<B>,
        _node: &Node,
        blocks: Vec<B::Block>,
    ) -> Vec<B::Block> {
        blocks
    }

    /// Transform the inline output for `node`.
    fn wrap_inlines(
        &self,
        _deps: &Dispatcher<B>,
        _node: &Node,
        inlines: Vec<B::Inline>,
    ) -> Vec<B::Inline> {
        inlines
    }
}

/// Converter built from a predicate and a conversion closure.
pub struct Rule<B, O, P, F> {
    predicate: P,
    convert: F,
    _marker: PhantomData<fn() -> (B, O)>,
}

impl<B, O, P, F> Rule<B, O, P, F>
where
    B: Backend,
    P: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&Dispatcher<B>, &Node, &StyleMap) -> Vec<O> + Send + Sync,
{
    /// Create a rule.
    pub fn new(predicate: P, convert: F) -> Self {
        Self {
            predicate,
            convert,
            _marker: PhantomData,
        }
    }
}

impl<B, O, P, F> ElementConverter<B, O> for Rule<B, O, P, F>
where
    B: Backend,
    P: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&Dispatcher<B>, &Node, &StyleMap) -> Vec<O> + Send + Sync,
{
    fn is_match(&self, node: &Node) -> bool {
        (self.predicate)(node)
    }

    fn convert(&self, deps: &Dispatcher<B>, node: &Node, cascaded: &StyleMap) -> Vec<O> {
        (self.convert)(deps, node, cascaded)
    }
}

/// Fallthrough built from a predicate and a block-wrapping closure.
pub struct Wrap<B, P, F> {
    predicate: P,
    wrap: F,
    _marker: PhantomData<fn() -> B>,
}

impl<B, P, F> Wrap<B, P, F>
where
    B: Backend,
    P: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&Dispatcher<B>, &Node, Vec<B::Block>) -> Vec<B::Block> + Send + Sync,
{
    /// Create a wrapping rule.
    pub fn new(predicate: P, wrap: F) -> Self {
        Self {
            predicate,
            wrap,
            _marker: PhantomData,
        }
    }
}

impl<B, P, F> FallthroughConverter<B> for Wrap<B, P, F>
where
    B: Backend,
    P: Fn(&Node) -> bool + Send + Sync,
    F: Fn(&Dispatcher<B>, &Node, Vec<B::Block>) -> Vec<B::Block> + Send + Sync,
{
    fn is_match(&self, node: &Node) -> bool {
        (self.predicate)(node)
    }

    fn wrap_blocks(&self, deps: &Dispatcher<B>, node: &Node, blocks: Vec<B::Block>) -> Vec<B::Block> {
        (self.wrap)(deps, node, blocks)
    }
}
