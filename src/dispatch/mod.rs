//! Element conversion dispatcher.
//!
//! Backends register block, inline and fallthrough converters on a
//! [`Dispatcher`]; the dispatcher walks the element tree, computes each
//! node's cascaded styles and routes the node to the first matching
//! converter.

mod converter;
mod dispatcher;

pub use converter::{Backend, ElementConverter, FallthroughConverter, Rule, Wrap};
pub use dispatcher::{Dispatcher, Parent};
